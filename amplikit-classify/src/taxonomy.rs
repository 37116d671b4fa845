//! Reference taxonomy strings and their deduplicated table.
//!
//! A reference taxonomy is an ordered list of rank tokens such as ``d:Bacteria`` or
//! ``g:Lactobacillus``, parsed from the payload of a ``;tax=...;`` FASTA annotation.
//! Many reference sequences share the same taxonomy, so the table stores each distinct
//! taxonomy once; rank tokens are additionally interned to small integer ids, which
//! makes "do these two taxonomies agree at depth d" an integer comparison.

use std::collections::HashMap;

/// Splits a ``;tax=...;`` payload into its rank tokens.
///
/// Empty tokens are dropped; the tokens keep their original spelling.
///
/// # Example
/// ```rust
/// use amplikit_classify::taxonomy::parse_rank_tokens;
/// let ranks = parse_rank_tokens("d:Bacteria,p:Firmicutes,g:Testus");
/// assert_eq!(ranks, vec!["d:Bacteria", "p:Firmicutes", "g:Testus"]);
/// assert!(parse_rank_tokens("").is_empty());
/// ```
pub fn parse_rank_tokens(tax: &str) -> Vec<String> {
    tax.split(',')
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// One distinct taxonomy of the reference database.
#[derive(Debug, Clone)]
pub struct UniqTaxonomy {
    /// the taxonomy as annotated, used for deterministic tie-breaking
    pub tax_string: String,
    /// rank tokens, outermost first
    pub ranks: Vec<String>,
    /// interned ids of the rank tokens
    pub rank_ids: Vec<u32>,
}

/// Deduplicated table of the taxonomies seen in a reference database.
#[derive(Debug, Default)]
pub struct TaxonomyTable {
    taxonomies: Vec<UniqTaxonomy>,
    slot_of: HashMap<String, u32>,
    token_ids: HashMap<String, u32>,
}

impl TaxonomyTable {
    pub fn new() -> Self {
        TaxonomyTable::default()
    }

    /// Files a taxonomy string and returns its slot, reusing the slot of a duplicate.
    ///
    /// Returns `None` for a taxonomy without any rank token.
    pub fn insert(&mut self, tax: &str) -> Option<u32> {
        if let Some(&slot) = self.slot_of.get(tax) {
            return Some(slot);
        }
        let ranks = parse_rank_tokens(tax);
        if ranks.is_empty() {
            return None;
        }
        let rank_ids = ranks.iter().map(|token| self.intern(token)).collect();
        let slot = self.taxonomies.len() as u32;
        self.taxonomies.push(UniqTaxonomy {
            tax_string: tax.to_string(),
            ranks,
            rank_ids,
        });
        self.slot_of.insert(tax.to_string(), slot);
        Some(slot)
    }

    fn intern(&mut self, token: &str) -> u32 {
        match self.token_ids.get(token) {
            Some(&id) => id,
            None => {
                let id = self.token_ids.len() as u32;
                self.token_ids.insert(token.to_string(), id);
                id
            }
        }
    }

    /// The taxonomy filed at a given slot
    pub fn taxonomy(&self, slot: u32) -> &UniqTaxonomy {
        &self.taxonomies[slot as usize]
    }

    /// Number of distinct taxonomies in this table
    pub fn len(&self) -> usize {
        self.taxonomies.len()
    }

    /// True when no taxonomy has been filed yet
    pub fn is_empty(&self) -> bool {
        self.taxonomies.is_empty()
    }
}
