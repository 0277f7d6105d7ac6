//! Per-account, per-asset balance totals over unspent outputs.

use std::collections::BTreeMap;

use super::IndexError;
use crate::domain::types::{AccountBalance, AssetAmount, UnspentOutput};
use crate::ports::AliasResolver;

/// Composite aggregation key. Field order gives the output order:
/// accounts ascending, then assets ascending within an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BalanceKey {
    account_id: String,
    asset_id: String,
}

/// Aggregates unspent outputs into [`AccountBalance`] entries.
pub struct BalanceIndexer<'a, A: ?Sized, S: ?Sized> {
    accounts: &'a A,
    assets: &'a S,
}

impl<'a, A, S> BalanceIndexer<'a, A, S>
where
    A: AliasResolver + ?Sized,
    S: AliasResolver + ?Sized,
{
    pub fn new(accounts: &'a A, assets: &'a S) -> Self {
        Self { accounts, assets }
    }

    /// One entry per distinct account, with exact per-asset sums.
    ///
    /// Fails only if a sum does not fit in `u64`.
    pub fn index<'u, I>(&self, utxos: I) -> Result<Vec<AccountBalance>, IndexError>
    where
        I: IntoIterator<Item = &'u UnspentOutput>,
    {
        let totals = sum_by_key(utxos)?;

        let mut balances: Vec<AccountBalance> = Vec::new();
        for (key, amount) in totals {
            let asset = AssetAmount {
                alias: self.assets.alias_by_id(&key.asset_id),
                asset_id: key.asset_id,
                amount,
            };

            match balances.last_mut() {
                Some(current) if current.account_id == key.account_id => {
                    current.balances.push(asset);
                }
                _ => balances.push(AccountBalance {
                    alias: self.accounts.alias_by_id(&key.account_id),
                    account_id: key.account_id,
                    balances: vec![asset],
                }),
            }
        }

        Ok(balances)
    }
}

fn sum_by_key<'u, I>(utxos: I) -> Result<BTreeMap<BalanceKey, u64>, IndexError>
where
    I: IntoIterator<Item = &'u UnspentOutput>,
{
    let mut totals: BTreeMap<BalanceKey, u64> = BTreeMap::new();

    for utxo in utxos {
        let key = BalanceKey {
            account_id: utxo.account_id.clone(),
            asset_id: hex::encode(&utxo.asset_id),
        };
        let total = totals.entry(key).or_insert(0);
        *total = total
            .checked_add(utxo.amount)
            .ok_or_else(|| IndexError::AmountOverflow {
                account_id: utxo.account_id.clone(),
                asset_id: hex::encode(&utxo.asset_id),
            })?;
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Aliases(HashMap<String, String>);

    impl Aliases {
        fn none() -> Self {
            Self(HashMap::new())
        }

        fn of(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl AliasResolver for Aliases {
        fn alias_by_id(&self, id: &str) -> String {
            self.0.get(id).cloned().unwrap_or_default()
        }
    }

    fn utxo(account: &str, asset: &[u8], amount: u64) -> UnspentOutput {
        UnspentOutput {
            account_id: account.to_string(),
            asset_id: asset.to_vec(),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_worked_example() {
        let input = vec![
            utxo("acc2", &[0xaa], 5),
            utxo("acc1", &[0xbb], 3),
            utxo("acc2", &[0xaa], 7),
        ];
        let none = Aliases::none();
        let out = BalanceIndexer::new(&none, &none).index(&input).unwrap();

        assert_eq!(
            out,
            vec![
                AccountBalance {
                    account_id: "acc1".into(),
                    alias: String::new(),
                    balances: vec![AssetAmount {
                        alias: String::new(),
                        asset_id: "bb".into(),
                        amount: 3,
                    }],
                },
                AccountBalance {
                    account_id: "acc2".into(),
                    alias: String::new(),
                    balances: vec![AssetAmount {
                        alias: String::new(),
                        asset_id: "aa".into(),
                        amount: 12,
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_assets_sorted_within_account() {
        let input = vec![
            utxo("acc1", &[0xff, 0x01], 1),
            utxo("acc1", &[0x0a], 2),
            utxo("acc1", &[0xab], 4),
            utxo("acc1", &[0x0a], 8),
        ];
        let none = Aliases::none();
        let out = BalanceIndexer::new(&none, &none).index(&input).unwrap();

        assert_eq!(out.len(), 1);
        let ids: Vec<_> = out[0].balances.iter().map(|b| b.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["0a", "ab", "ff01"]);
        assert_eq!(out[0].balances[0].amount, 10);
    }

    #[test]
    fn test_aliases_resolved() {
        let input = vec![utxo("acc1", &[0xbb], 3)];
        let accounts = Aliases::of(&[("acc1", "alice")]);
        let assets = Aliases::of(&[("bb", "gold")]);
        let out = BalanceIndexer::new(&accounts, &assets).index(&input).unwrap();

        assert_eq!(out[0].alias, "alice");
        assert_eq!(out[0].balances[0].alias, "gold");
    }

    #[test]
    fn test_empty_input() {
        let none = Aliases::none();
        let out = BalanceIndexer::new(&none, &none).index(&Vec::<UnspentOutput>::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_prefiltered_input() {
        let input = vec![utxo("acc1", &[0xbb], 3), utxo("acc2", &[0xaa], 5)];
        let none = Aliases::none();
        let out = BalanceIndexer::new(&none, &none)
            .index(input.iter().filter(|u| u.account_id == "acc2"))
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].account_id, "acc2");
    }

    #[test]
    fn test_overflow_fails_fast() {
        let input = vec![utxo("acc1", &[0xaa], u64::MAX), utxo("acc1", &[0xaa], 1)];
        let none = Aliases::none();
        let err = BalanceIndexer::new(&none, &none).index(&input).unwrap_err();

        assert_eq!(
            err,
            IndexError::AmountOverflow {
                account_id: "acc1".into(),
                asset_id: "aa".into(),
            }
        );
    }

    #[test]
    fn test_max_amount_without_overflow() {
        let input = vec![utxo("acc1", &[0xaa], u64::MAX - 1), utxo("acc1", &[0xaa], 1)];
        let none = Aliases::none();
        let out = BalanceIndexer::new(&none, &none).index(&input).unwrap();
        assert_eq!(out[0].balances[0].amount, u64::MAX);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_utxos() -> impl Strategy<Value = Vec<UnspentOutput>> {
            prop::collection::vec(
                (0u8..6, 0u8..4, 0u64..1_000_000).prop_map(|(acc, asset, amount)| {
                    utxo(&format!("acc{acc}"), &[asset, 0x10], amount)
                }),
                0..64,
            )
        }

        proptest! {
            #[test]
            fn one_entry_per_account_with_exact_sums(input in arb_utxos()) {
                let none = Aliases::none();
                let out = BalanceIndexer::new(&none, &none).index(&input).unwrap();

                let mut expected: BTreeMap<(String, String), u64> = BTreeMap::new();
                for u in &input {
                    let key = (u.account_id.clone(), hex::encode(&u.asset_id));
                    *expected.entry(key).or_default() += u.amount;
                }
                let accounts: std::collections::BTreeSet<_> =
                    input.iter().map(|u| u.account_id.clone()).collect();

                prop_assert_eq!(out.len(), accounts.len());
                let pairs: usize = out.iter().map(|b| b.balances.len()).sum();
                prop_assert_eq!(pairs, expected.len());

                for balance in &out {
                    for asset in &balance.balances {
                        let key = (balance.account_id.clone(), asset.asset_id.clone());
                        prop_assert_eq!(Some(&asset.amount), expected.get(&key));
                    }
                }
            }

            #[test]
            fn ordering_strictly_ascending(input in arb_utxos()) {
                let none = Aliases::none();
                let out = BalanceIndexer::new(&none, &none).index(&input).unwrap();

                for pair in out.windows(2) {
                    prop_assert!(pair[0].account_id < pair[1].account_id);
                }
                for balance in &out {
                    for pair in balance.balances.windows(2) {
                        prop_assert!(pair[0].asset_id < pair[1].asset_id);
                    }
                }
            }

            #[test]
            fn idempotent_serialization(input in arb_utxos()) {
                let none = Aliases::none();
                let indexer = BalanceIndexer::new(&none, &none);
                let first = serde_json::to_vec(&indexer.index(&input).unwrap()).unwrap();
                let second = serde_json::to_vec(&indexer.index(&input).unwrap()).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
