mod entry_list;

pub(crate) use entry_list::{RawEntryList, RawIter, TieBreak};
