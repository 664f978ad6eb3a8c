use super::blocks::directive;

/// Split a document body (frontmatter already removed) into raw slides.
///
/// A slide ends at:
/// 1. a `---` rule with blank lines (or the document edge) on both sides,
/// 2. three or more consecutive blank lines,
/// 3. a `# ` heading once the current slide has content. Directive lines
///    written just above such a heading belong to the heading's slide.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();
    let mut slides = Slides::default();
    let mut blank_run = 0;

    for (i, &line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_run += 1;
            match blank_run {
                1 | 2 => slides.push(line),
                3 => slides.cut(),
                _ => {}
            }
            continue;
        }
        blank_run = 0;

        let prev_blank = i == 0 || lines[i - 1].trim().is_empty();
        let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
        if is_rule(trimmed) && prev_blank && next_blank {
            slides.cut();
            continue;
        }
        if line.starts_with("# ") && slides.has_content {
            slides.cut_before_heading();
        }
        slides.push(line);
    }
    slides.finish()
}

#[derive(Default)]
struct Slides<'a> {
    done: Vec<String>,
    current: Vec<&'a str>,
    has_content: bool,
}

impl<'a> Slides<'a> {
    fn push(&mut self, line: &'a str) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && directive(trimmed).is_none() {
            self.has_content = true;
        }
        self.current.push(line);
    }

    fn cut(&mut self) {
        let text = self.current.join("\n");
        let text = text.trim();
        if !text.is_empty() {
            self.done.push(text.to_string());
        }
        self.current.clear();
        self.has_content = false;
    }

    fn cut_before_heading(&mut self) {
        let keep = self
            .current
            .iter()
            .rposition(|l| {
                let t = l.trim();
                !t.is_empty() && directive(t).is_none()
            })
            .map_or(0, |i| i + 1);
        let carried: Vec<&'a str> = self
            .current
            .split_off(keep)
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect();
        self.cut();
        self.current = carried;
    }

    fn finish(mut self) -> Vec<String> {
        self.cut();
        self.done
    }
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_gap() {
        assert_eq!(split("Slide one\n\n\n\nSlide two"), vec!["Slide one", "Slide two"]);
        assert_eq!(split("Slide one\n\n\nstill one").len(), 1);
    }

    #[test]
    fn dash_rule() {
        assert_eq!(split("Slide one\n\n---\n\nSlide two"), vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn rule_needs_blank_lines_around_it() {
        assert_eq!(split("Slide one\n---\nstill one").len(), 1);
    }

    #[test]
    fn heading_starts_a_new_slide() {
        let slides = split("# First\n\nContent\n\n# Second\n\nMore content");
        assert_eq!(slides.len(), 2);
        assert!(slides[0].starts_with("# First"));
        assert!(slides[1].starts_with("# Second"));
    }

    #[test]
    fn first_or_lower_heading_does_not_split() {
        assert_eq!(split("# Only Heading\n\nContent here").len(), 1);
        assert_eq!(split("# Title\n\n## Subtitle\n\nContent").len(), 1);
    }

    #[test]
    fn overlapping_separators_make_one_break() {
        assert_eq!(split("Slide one\n\n\n\n---\n\n\n\nSlide two").len(), 2);
    }

    #[test]
    fn directives_move_with_the_heading() {
        let slides = split("# Title\n\nSubtitle\n\n@chapter: craft\n@theme: light\n# Second\n\nBody");
        assert_eq!(slides.len(), 2);
        assert!(!slides[0].contains("@chapter"));
        assert!(slides[1].starts_with("@chapter: craft\n@theme: light\n# Second"));
    }

    #[test]
    fn directives_alone_are_not_content() {
        let slides = split("@chapter: intro\n# Hello\n\nWorld");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(split("One\r\n\r\n---\r\n\r\nTwo"), vec!["One", "Two"]);
    }
}
