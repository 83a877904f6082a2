//! Display formatting for entries.
//!
//! Four independent renderings, each memoized on first request: a
//! compact markup label for list rows, a plain extensive form, an HTML
//! extensive form, and a filename-safe form. Memoization never
//! invalidates — it relies on entries being frozen after the rebuild
//! publishes them (see [`Entry`]).

use crate::models::Entry;

impl Entry {
    /// `"Surname"`, `"A & B"`, or `"First et al."` for three or more.
    pub fn format_author(&self) -> String {
        match self.authors.as_slice() {
            [] => "Unknown author".to_string(),
            [only] => only.clone(),
            [first, second] => format!("{} & {}", first, second),
            [first, ..] => format!("{} et al.", first),
        }
    }

    /// The year or special date literal, parenthesized.
    pub fn format_date(&self) -> String {
        match &self.date {
            Some(date) => format!("({})", date),
            None => "(Date unknown)".to_string(),
        }
    }

    pub fn format_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown title")
    }

    pub fn format_publication(&self) -> &str {
        self.publication.as_deref().unwrap_or("Unknown journal")
    }

    pub fn format_tags(&self) -> String {
        self.tags.join(", ")
    }

    /// `"Author (Date)"` — the lead line of every extensive format.
    pub fn author_date(&self) -> String {
        format!("{} {}", self.format_author(), self.format_date())
    }

    /// Compact markup label for result rows.
    pub fn label_format(&self) -> &str {
        self.label_cache.get_or_init(|| self.render_label())
    }

    /// Plain extensive representation.
    pub fn full_format(&self) -> &str {
        self.full_cache.get_or_init(|| self.render_full())
    }

    /// HTML extensive representation.
    pub fn html_format(&self) -> &str {
        self.html_cache.get_or_init(|| self.render_html())
    }

    /// Filename-safe representation.
    pub fn filename_format(&self) -> &str {
        self.filename_cache.get_or_init(|| self.render_filename())
    }

    fn render_label(&self) -> String {
        let mut s = format!("<b>{}</b>", self.author_date());
        if self.title.is_some() || self.publication.is_some() {
            s.push_str("\n<small>");
            if let Some(title) = &self.title {
                s.push_str(title);
            }
            if let Some(publication) = &self.publication {
                s.push_str("\n<i>");
                s.push_str(publication);
                if let Some(volume) = &self.volume {
                    s.push_str(", ");
                    s.push_str(volume);
                }
                s.push_str("</i>");
                if let Some(issue) = &self.issue {
                    s.push('(');
                    s.push_str(issue);
                    s.push(')');
                }
            }
            s.push_str("</small>");
        }
        s.replace('&', "&amp;")
    }

    fn render_full(&self) -> String {
        let mut s = self.author_date();
        if let Some(title) = &self.title {
            s.push('\n');
            s.push_str(title);
        }
        if let Some(publication) = &self.publication {
            s.push('\n');
            s.push_str(publication);
            if let Some(volume) = &self.volume {
                s.push_str(", ");
                s.push_str(volume);
            }
            if let Some(issue) = &self.issue {
                s.push('(');
                s.push_str(issue);
                s.push(')');
            }
        }
        if !self.tags.is_empty() {
            s.push('\n');
            s.push_str(&self.format_tags());
        }
        s
    }

    fn render_html(&self) -> String {
        let mut s = format!("<b>{}</b>", self.author_date());
        if let Some(title) = &self.title {
            s.push_str("<br/>");
            s.push_str(title);
        }
        if let Some(publication) = &self.publication {
            s.push_str("<br/><i>");
            s.push_str(publication);
            s.push_str("</i>");
            if let Some(volume) = &self.volume {
                s.push_str(", ");
                s.push_str(volume);
                if let Some(issue) = &self.issue {
                    s.push('(');
                    s.push_str(issue);
                    s.push(')');
                }
            }
        }
        if !self.tags.is_empty() {
            s.push_str("<br/><b><small>");
            s.push_str(&self.format_tags());
            s.push_str("</small></b>");
        }
        s
    }

    fn render_filename(&self) -> String {
        format!(
            "{} {}",
            self.format_author(),
            self.format_date().replace('\\', "")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Entry {
        let mut entry = Entry::new(1);
        entry.title = Some("Gradient-Based Learning".to_string());
        entry.publication = Some("Proceedings of the IEEE".to_string());
        entry.volume = Some("86".to_string());
        entry.issue = Some("11".to_string());
        entry.date = Some("1998".to_string());
        entry.authors = vec![
            "Lecun".to_string(),
            "Bottou".to_string(),
            "Bengio".to_string(),
        ];
        entry.tags = vec!["cnn".to_string(), "classic".to_string()];
        entry
    }

    #[test]
    fn author_formatting_by_count() {
        let mut entry = Entry::new(1);
        assert_eq!(entry.format_author(), "Unknown author");
        entry.authors = vec!["Smith".to_string()];
        assert_eq!(entry.format_author(), "Smith");
        entry.authors.push("Jones".to_string());
        assert_eq!(entry.format_author(), "Smith & Jones");
        entry.authors.push("Doe".to_string());
        assert_eq!(entry.format_author(), "Smith et al.");
    }

    #[test]
    fn date_formatting() {
        let mut entry = Entry::new(1);
        assert_eq!(entry.format_date(), "(Date unknown)");
        entry.date = Some("in press".to_string());
        assert_eq!(entry.format_date(), "(in press)");
    }

    #[test]
    fn full_format_layout() {
        let entry = article();
        assert_eq!(
            entry.full_format(),
            "Lecun et al. (1998)\nGradient-Based Learning\nProceedings of the IEEE, 86(11)\ncnn, classic"
        );
    }

    #[test]
    fn html_format_layout() {
        let entry = article();
        assert_eq!(
            entry.html_format(),
            "<b>Lecun et al. (1998)</b><br/>Gradient-Based Learning\
             <br/><i>Proceedings of the IEEE</i>, 86(11)\
             <br/><b><small>cnn, classic</small></b>"
        );
    }

    #[test]
    fn label_format_escapes_ampersands() {
        let mut entry = Entry::new(1);
        entry.authors = vec!["Smith".to_string(), "Jones".to_string()];
        entry.date = Some("2020".to_string());
        entry.title = Some("Salt & Light".to_string());
        let label = entry.label_format();
        assert!(label.starts_with("<b>Smith &amp; Jones (2020)</b>"));
        assert!(label.contains("Salt &amp; Light"));
        assert!(label.ends_with("</small>"));
    }

    #[test]
    fn minimal_entry_label_has_no_small_block() {
        let entry = Entry::new(1);
        assert_eq!(entry.label_format(), "<b>Unknown author (Date unknown)</b>");
    }

    #[test]
    fn formats_are_memoized_without_invalidation() {
        let mut entry = article();
        let before = entry.full_format().to_string();
        // Entries are frozen after publication; a late mutation must not
        // leak into the already-rendered string.
        entry.title = Some("Renamed".to_string());
        assert_eq!(entry.full_format(), before);
    }

    #[test]
    fn filename_format_is_author_date() {
        let entry = article();
        assert_eq!(entry.filename_format(), "Lecun et al. (1998)");
    }
}
