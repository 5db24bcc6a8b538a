//! Lower level codec components.
//! `bits` packs and unpacks the bit stream, `huff_tree` maintains the
//! adaptive code tree.  Both are used by the `word_huff` module.

pub mod bits;
pub mod huff_tree;
