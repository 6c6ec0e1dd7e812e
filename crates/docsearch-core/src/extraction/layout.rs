use crate::config::PdfConfig;
use crate::extraction::{PageContent, WordBox};
use crate::model::ReconstructedLine;

/// Rebuilds text lines from positioned words.
///
/// Words whose bottoms are within `line_tolerance` of a line's first word
/// share that line. Inside a line, gaps wider than `column_gap` are
/// rendered as a tab so table columns stay apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub line_tolerance: f32,
    pub column_gap: f32,
}

impl Default for LineLayout {
    fn default() -> Self {
        LineLayout::from_config(&PdfConfig::default())
    }
}

impl LineLayout {
    pub fn from_config(config: &PdfConfig) -> Self {
        LineLayout {
            line_tolerance: config.line_tolerance,
            column_gap: config.column_gap,
        }
    }

    /// Lines of every page, in page order.
    pub fn reconstruct(&self, pages: &[PageContent]) -> Vec<ReconstructedLine> {
        pages
            .iter()
            .flat_map(|page| {
                self.page_lines(&page.words)
                    .into_iter()
                    .map(move |text| ReconstructedLine::new(page.page_number, text))
            })
            .collect()
    }

    /// Non-blank lines of one page, top to bottom.
    pub fn page_lines(&self, words: &[WordBox]) -> Vec<String> {
        // (representative bottom, members)
        let mut groups: Vec<(f32, Vec<&WordBox>)> = Vec::new();
        for word in words {
            match groups
                .iter_mut()
                .find(|(bottom, _)| (bottom - word.bottom).abs() <= self.line_tolerance)
            {
                Some((_, members)) => members.push(word),
                None => groups.push((word.bottom, vec![word])),
            }
        }

        groups.sort_by(|a, b| b.0.total_cmp(&a.0));

        groups
            .into_iter()
            .filter_map(|(_, mut members)| {
                members.sort_by(|a, b| a.left.total_cmp(&b.left));
                let line = self.join_words(&members);
                let trimmed = line.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    fn join_words(&self, words: &[&WordBox]) -> String {
        let mut line = String::new();
        let mut previous: Option<&WordBox> = None;
        for word in words {
            if let Some(prev) = previous {
                let gap = word.left - prev.right;
                line.push(if gap > self.column_gap { '\t' } else { ' ' });
            }
            line.push_str(&word.text);
            previous = Some(word);
        }
        line
    }
}
