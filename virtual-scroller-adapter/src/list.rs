use alloc::sync::Arc;
use alloc::vec::Vec;

use virtual_scroller::{DataItem, FOOTER_ID, HEADER_ID};

use crate::{IdentityFn, SortIndexFn};

/// Render payload of a list entry: what the host draws for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entry {
    Header,
    /// Index into the caller's items.
    Item(usize),
    Footer,
}

/// Builds the engine's [`DataItem`] list from caller items, reusing the previous list while
/// its inputs are unchanged.
///
/// Inputs are compared by identity (`Arc::ptr_eq`) for the items and callbacks, and by value
/// for the header/footer flags.
pub struct ListBuilder<T> {
    cached: Option<(Inputs<T>, Arc<[DataItem<Entry>]>)>,
}

struct Inputs<T> {
    items: Arc<[T]>,
    identity: IdentityFn<T>,
    sort_index: Option<SortIndexFn<T>>,
    header: bool,
    footer: bool,
}

impl<T> Inputs<T> {
    fn same_as(&self, other: &Inputs<T>) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
            && Arc::ptr_eq(&self.identity, &other.identity)
            && same_arc(&self.sort_index, &other.sort_index)
            && self.header == other.header
            && self.footer == other.footer
    }
}

pub(crate) fn same_arc<F: ?Sized>(a: &Option<Arc<F>>, b: &Option<Arc<F>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        Self { cached: None }
    }
}

impl<T> core::fmt::Debug for ListBuilder<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListBuilder")
            .field("cached_len", &self.cached.as_ref().map(|(_, list)| list.len()))
            .finish()
    }
}

impl<T> ListBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        &mut self,
        items: &Arc<[T]>,
        identity: &IdentityFn<T>,
        sort_index: Option<&SortIndexFn<T>>,
        header: bool,
        footer: bool,
    ) -> Arc<[DataItem<Entry>]> {
        let inputs = Inputs {
            items: Arc::clone(items),
            identity: Arc::clone(identity),
            sort_index: sort_index.cloned(),
            header,
            footer,
        };
        if let Some((cached, list)) = &self.cached {
            if cached.same_as(&inputs) {
                return Arc::clone(list);
            }
        }

        let mut list = Vec::with_capacity(items.len() + usize::from(header) + usize::from(footer));
        if header {
            list.push(DataItem::new(HEADER_ID, Entry::Header));
        }
        list.extend(items.iter().enumerate().map(|(i, item)| {
            DataItem::new(identity(item), Entry::Item(i))
                .with_sort_index(sort_index.map(|sort| sort(item)))
        }));
        if footer {
            list.push(DataItem::new(FOOTER_ID, Entry::Footer));
        }
        vtrace!(len = list.len(), "ListBuilder::build");

        let list: Arc<[DataItem<Entry>]> = Arc::from(list);
        self.cached = Some((inputs, Arc::clone(&list)));
        list
    }

    /// Forgets the memoized list.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
