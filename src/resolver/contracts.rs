//! Contract resolution: contract name -> the single component satisfying it.

use std::collections::HashMap;

use crate::core::{ComponentId, DescriptorSet};
use crate::resolver::errors::{Candidate, ResolveError, ResolveErrors};

/// Mapping from contract name to its implementing component.
///
/// Contracts claimed by more than one component are kept aside; they never
/// resolve and are reported through [`ContractMap::errors`].
#[derive(Debug, Clone, Default)]
pub struct ContractMap {
    entries: HashMap<String, ComponentId>,
    claims: Vec<(String, Vec<ComponentId>)>,
}

impl ContractMap {
    /// Record every declared contract. Never fails; see [`Self::errors`].
    pub fn build(set: &DescriptorSet) -> Self {
        let mut claims: Vec<(String, Vec<ComponentId>)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for (id, desc) in set.iter() {
            let Some(contract) = desc.contract() else {
                continue;
            };
            match slots.get(contract) {
                Some(&i) => claims[i].1.push(id),
                None => {
                    slots.insert(contract, claims.len());
                    claims.push((contract.to_string(), vec![id]));
                }
            }
        }

        let entries = claims
            .iter()
            .filter_map(|(contract, ids)| match ids.as_slice() {
                [only] => Some((contract.clone(), *only)),
                _ => None,
            })
            .collect();

        ContractMap { entries, claims }
    }

    /// The component satisfying `contract`, if exactly one does.
    pub fn get(&self, contract: &str) -> Option<ComponentId> {
        self.entries.get(contract).copied()
    }

    pub fn is_ambiguous(&self, contract: &str) -> bool {
        self.claims
            .iter()
            .any(|(c, ids)| c == contract && ids.len() > 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One error per ambiguous contract, in first-declaration order.
    pub fn errors(&self, set: &DescriptorSet) -> Vec<ResolveError> {
        self.claims
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(contract, ids)| ResolveError::AmbiguousContract {
                contract: contract.clone(),
                components: ids.iter().map(|&id| Candidate::of(set, id)).collect(),
            })
            .collect()
    }
}

/// Build the contract map, failing with every ambiguous contract at once.
pub fn resolve_contracts(set: &DescriptorSet) -> Result<ContractMap, ResolveErrors> {
    let map = ContractMap::build(set);
    ResolveErrors(map.errors(set)).into_result()?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{component, grouped, set_of};

    #[test]
    fn test_unique_contracts() {
        let set = set_of(vec![
            component("SmtpMailer").contract("IMailer"),
            component("SystemClock").contract("IClock"),
            component("Plain"),
        ]);

        let map = resolve_contracts(&set).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("IMailer"), Some(ComponentId(0)));
        assert_eq!(map.get("IClock"), Some(ComponentId(1)));
        assert_eq!(map.get("Plain"), None);
    }

    #[test]
    fn test_duplicates_across_groups_reported() {
        let set = grouped(vec![
            ("a", vec![component("SmtpMailer").contract("IMailer").source("a/smtp.ts")]),
            ("b", vec![component("FakeMailer").contract("IMailer").source("b/fake.ts")]),
        ]);

        let errors = resolve_contracts(&set).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors.0[0] {
            ResolveError::AmbiguousContract {
                contract,
                components,
            } => {
                assert_eq!(contract, "IMailer");
                let names: Vec<_> = components.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["SmtpMailer", "FakeMailer"]);
                assert_eq!(components[1].group, "b");
                assert_eq!(components[1].source.to_str(), Some("b/fake.ts"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_every_ambiguous_contract_in_one_pass() {
        let set = set_of(vec![
            component("A1").contract("A"),
            component("B1").contract("B"),
            component("A2").contract("A"),
            component("B2").contract("B"),
            component("A3").contract("A"),
        ]);

        let map = ContractMap::build(&set);
        assert!(map.is_ambiguous("A"));
        assert!(map.get("A").is_none());

        let errors = map.errors(&set);
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ResolveError::AmbiguousContract { contract, components } if contract == "A" && components.len() == 3));
        assert!(matches!(&errors[1], ResolveError::AmbiguousContract { contract, components } if contract == "B" && components.len() == 2));
    }

    #[test]
    fn test_empty_contract_ignored() {
        let set = set_of(vec![component("A").contract(""), component("B").contract("")]);
        assert!(resolve_contracts(&set).unwrap().is_empty());
    }
}
