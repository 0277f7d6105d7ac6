//! Display form of unspent outputs.

use crate::domain::types::{AnnotatedUnspentOutput, UnspentOutput};
use crate::ports::AliasResolver;

/// Maps each [`UnspentOutput`] to an [`AnnotatedUnspentOutput`], one-to-one and in input order.
pub struct UnspentOutputIndexer<'a, A: ?Sized> {
    accounts: &'a A,
}

impl<'a, A: AliasResolver + ?Sized> UnspentOutputIndexer<'a, A> {
    pub fn new(accounts: &'a A) -> Self {
        Self { accounts }
    }

    pub fn index(&self, utxos: &[UnspentOutput]) -> Vec<AnnotatedUnspentOutput> {
        utxos.iter().map(|utxo| self.annotate(utxo)).collect()
    }

    pub fn annotate(&self, utxo: &UnspentOutput) -> AnnotatedUnspentOutput {
        AnnotatedUnspentOutput {
            alias: self.accounts.alias_by_id(&utxo.account_id),
            output_id: hex::encode(&utxo.output_id),
            asset_id: hex::encode(&utxo.asset_id),
            amount: utxo.amount,
            account_id: utxo.account_id.clone(),
            program_index: utxo.program_index,
            program: hex::encode(&utxo.program),
            source_id: hex::encode(&utxo.source_id),
            source_pos: utxo.source_pos,
            ref_data: hex::encode(&utxo.ref_data),
            change: utxo.change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl AliasResolver for Fixed {
        fn alias_by_id(&self, id: &str) -> String {
            if id == "acc1" {
                "alice".to_string()
            } else {
                String::new()
            }
        }
    }

    fn sample(account: &str, output: u8) -> UnspentOutput {
        UnspentOutput {
            output_id: vec![output, 0xAB],
            source_id: vec![0xDE, 0xAD, 0xBE, 0xEF],
            asset_id: vec![0xFF; 32],
            amount: 42,
            source_pos: 1,
            program: vec![0x00, 0x14, 0x0F],
            ref_data: vec![],
            account_id: account.to_string(),
            program_index: 7,
            change: true,
        }
    }

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn test_one_to_one_order_preserved() {
        let input = vec![sample("acc2", 3), sample("acc1", 1), sample("acc2", 2)];
        let out = UnspentOutputIndexer::new(&Fixed).index(&input);

        assert_eq!(out.len(), input.len());
        let ids: Vec<_> = out.iter().map(|o| o.output_id.as_str()).collect();
        assert_eq!(ids, vec!["03ab", "01ab", "02ab"]);
    }

    #[test]
    fn test_hex_fields_lowercase_double_length() {
        let input = vec![sample("acc1", 0xC0)];
        let out = &UnspentOutputIndexer::new(&Fixed).index(&input)[0];
        let src = &input[0];

        for (hex, bytes) in [
            (&out.output_id, &src.output_id),
            (&out.source_id, &src.source_id),
            (&out.asset_id, &src.asset_id),
            (&out.program, &src.program),
            (&out.ref_data, &src.ref_data),
        ] {
            assert_eq!(hex.len(), bytes.len() * 2);
            assert!(is_lower_hex(hex), "{hex} is not lowercase hex");
        }
        assert_eq!(out.source_id, "deadbeef");
    }

    #[test]
    fn test_scalars_and_alias_copied() {
        let out = UnspentOutputIndexer::new(&Fixed).annotate(&sample("acc1", 0));
        assert_eq!(out.alias, "alice");
        assert_eq!(out.account_id, "acc1");
        assert_eq!(out.amount, 42);
        assert_eq!(out.program_index, 7);
        assert_eq!(out.source_pos, 1);
        assert!(out.change);

        let other = UnspentOutputIndexer::new(&Fixed).annotate(&sample("acc9", 0));
        assert!(other.alias.is_empty());
    }

    #[test]
    fn test_no_aggregation() {
        let input = vec![sample("acc1", 1), sample("acc1", 1)];
        assert_eq!(UnspentOutputIndexer::new(&Fixed).index(&input).len(), 2);
    }
}
