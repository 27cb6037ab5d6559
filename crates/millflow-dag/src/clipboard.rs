use crate::node::NodeContent;
use crate::types::SheetId;

/// Content of the last cut node. Edges are not kept; they are rebuilt at
/// paste time from the paste target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipboard {
    pub content: NodeContent,
    pub source_sheet: SheetId,
}

impl Clipboard {
    pub fn new(content: NodeContent, source_sheet: SheetId) -> Self {
        Self {
            content,
            source_sheet,
        }
    }
}
