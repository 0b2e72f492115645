use crate::ItemId;

/// Reserved id of the synthetic header entry.
pub const HEADER_ID: &str = "$header";
/// Reserved id of the synthetic footer entry.
pub const FOOTER_ID: &str = "$footer";

/// One logical list entry as seen by the engine.
///
/// `data` is an opaque render payload; the engine only reads `id` and `can_be_anchor`.
#[derive(Clone, Debug, PartialEq)]
pub struct DataItem<T> {
    pub id: ItemId,
    pub data: T,
    pub can_be_anchor: bool,
    pub sort_index: Option<i64>,
}

impl<T> DataItem<T> {
    pub fn new(id: impl Into<ItemId>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
            can_be_anchor: true,
            sort_index: None,
        }
    }

    pub fn with_can_be_anchor(mut self, can_be_anchor: bool) -> Self {
        self.can_be_anchor = can_be_anchor;
        self
    }

    pub fn with_sort_index(mut self, sort_index: Option<i64>) -> Self {
        self.sort_index = sort_index;
        self
    }

    /// Whether this entry is a synthetic header or footer.
    pub fn is_synthetic(&self) -> bool {
        self.id == HEADER_ID || self.id == FOOTER_ID
    }
}
