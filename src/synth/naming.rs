//! Identifier derivation and the aliasing table.
//!
//! Identifiers are a pure function of component and group names. When two
//! components derive the same identifier, the owning group's name is used as
//! a discriminator, then a numeric suffix in input order. The resulting
//! [`NameTable`] is built once per run and read by every later stage.

use std::collections::{HashMap, HashSet};

use crate::core::{ComponentId, DescriptorSet, GroupId};

/// Words that cannot be used as bare identifiers in the emitted code.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "container", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "implements", "interface", "package", "private", "protected", "public", "await",
];

/// Strip non-alphanumerics and lowercase the first letter.
///
/// `UserService` -> `userService`, `http-client` -> `httpclient`.
pub fn ident_base(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let mut ident = lower_first(&stripped);
    if ident.is_empty() {
        ident.push_str("component");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push_str("Component");
    }
    ident
}

/// Capitalize each alphanumeric word and join: `web-app` -> `WebApp`.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::new();
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        out.push_str(&upper_first(word));
    }
    if out.is_empty() {
        out.push_str("Group");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Lowercase words joined by `-`: `WebApp` -> `web-app`, `web_app` -> `web-app`.
pub fn kebab_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    if words.is_empty() {
        "group".to_string()
    } else {
        words.join("-")
    }
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether `key` can be used after a `.` in property access.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Property access expression: `base.key` or `base["key"]`.
pub fn property_access(base: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{}.{}", base, key)
    } else {
        format!("{}[{}]", base, quote(key))
    }
}

/// Object-literal property name: `key` or `"key"`.
pub fn property_name(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// A double-quoted, escaped string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Assign unique names. Items whose `primary` is unique keep it; the rest
/// take `fallback`, suffixed with 2, 3, ... until unused. `taken` seeds
/// names that must not be produced.
fn assign_unique(items: &[(String, String)], mut taken: HashSet<String>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (primary, _) in items {
        *counts.entry(primary.as_str()).or_default() += 1;
    }

    let keeps: Vec<bool> = items
        .iter()
        .map(|(primary, _)| counts[primary.as_str()] == 1 && !taken.contains(primary))
        .collect();
    for ((primary, _), keep) in items.iter().zip(&keeps) {
        if *keep {
            taken.insert(primary.clone());
        }
    }

    items
        .iter()
        .zip(keeps)
        .map(|((primary, fallback), keep)| {
            if keep {
                return primary.clone();
            }
            let mut name = fallback.clone();
            let mut n = 2;
            while taken.contains(&name) {
                name = format!("{}{}", fallback, n);
                n += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Every name a component declares in its group function for `ident`.
fn declared_names(ident: &str) -> [String; 3] {
    [
        ident.to_string(),
        format!("get{}", upper_first(ident)),
        format!("{}Factory", ident),
    ]
}

/// Like [`assign_unique`], but an ident is only free when its accessor and
/// factory names are free too.
fn assign_idents(items: &[(String, String)], mut taken: HashSet<String>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (primary, _) in items {
        *counts.entry(primary.as_str()).or_default() += 1;
    }

    let is_free = |taken: &HashSet<String>, ident: &str| {
        declared_names(ident).iter().all(|name| !taken.contains(name))
    };

    let mut assigned: Vec<Option<String>> = vec![None; items.len()];
    for (slot, (primary, _)) in assigned.iter_mut().zip(items) {
        if counts[primary.as_str()] == 1 && is_free(&taken, primary) {
            taken.extend(declared_names(primary));
            *slot = Some(primary.clone());
        }
    }

    assigned
        .into_iter()
        .zip(items)
        .map(|(kept, (_, fallback))| {
            if let Some(ident) = kept {
                return ident;
            }
            let mut ident = fallback.clone();
            let mut n = 2;
            while !is_free(&taken, &ident) {
                ident = format!("{}{}", fallback, n);
                n += 1;
            }
            taken.extend(declared_names(&ident));
            ident
        })
        .collect()
}

/// Derived names of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNames {
    /// Base identifier; also the memoized slot of a shared component.
    pub ident: String,
    /// Local name the component class is imported under.
    pub class_alias: String,
    /// Key of the component in its group's returned mapping.
    pub export_key: String,
}

impl ComponentNames {
    /// Accessor of a shared component: `getUserService`.
    pub fn accessor(&self) -> String {
        format!("get{}", upper_first(&self.ident))
    }

    /// Factory of a unique component: `userServiceFactory`.
    pub fn factory(&self) -> String {
        format!("{}Factory", self.ident)
    }
}

/// Derived names of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNames {
    pub pascal: String,
    /// File stem of the group's unit in split output.
    pub file_stem: String,
}

impl GroupNames {
    /// Composition function: `createCoreGroup`.
    pub fn function(&self) -> String {
        format!("create{}Group", self.pascal)
    }

    /// Type of the composition result: `CoreGroup`.
    pub fn type_name(&self) -> String {
        format!("{}Group", self.pascal)
    }

    /// Parameter / instance name: `coreGroup`.
    pub fn instance(&self) -> String {
        format!("{}Group", lower_first(&self.pascal))
    }
}

/// Every identifier the emitted code uses, derived once per run.
#[derive(Debug, Clone)]
pub struct NameTable {
    components: Vec<ComponentNames>,
    groups: Vec<GroupNames>,
}

impl NameTable {
    /// Build the table. `reserved_stems` are file stems group units must
    /// avoid (the aggregator unit's).
    pub fn build(set: &DescriptorSet, reserved_stems: &[&str]) -> Self {
        let group_items: Vec<(String, String)> = set
            .group_ids()
            .map(|g| {
                let pascal = pascal_case(set.group_name(g));
                (pascal.clone(), pascal)
            })
            .collect();
        let pascals = assign_unique(&group_items, HashSet::new());

        let stem_items: Vec<(String, String)> = set
            .group_ids()
            .map(|g| {
                let stem = kebab_case(set.group_name(g));
                (stem.clone(), format!("{}-group", stem))
            })
            .collect();
        let stems = assign_unique(
            &stem_items,
            reserved_stems.iter().map(|s| s.to_string()).collect(),
        );

        let groups: Vec<GroupNames> = pascals
            .into_iter()
            .zip(stems)
            .map(|(pascal, file_stem)| GroupNames { pascal, file_stem })
            .collect();

        // Group-level names live in the same scope as component names.
        let mut group_scope: HashSet<String> = HashSet::new();
        let mut type_scope: HashSet<String> = HashSet::new();
        for g in &groups {
            group_scope.insert(g.instance());
            group_scope.insert(g.function());
            type_scope.insert(g.instance());
            type_scope.insert(g.type_name());
            type_scope.insert(g.function());
        }

        // Module scope also holds the aggregator's own declarations.
        type_scope.insert("container".to_string());
        type_scope.insert("Container".to_string());

        let class_items: Vec<(String, String)> = set
            .iter()
            .map(|(id, desc)| {
                let class = upper_first(&ident_base(&desc.name));
                let class = if is_identifier(&desc.name) {
                    desc.name.clone()
                } else {
                    class
                };
                let group = &groups[set.group_of(id).index()].pascal;
                (class.clone(), format!("{}{}", group, upper_first(&class)))
            })
            .collect();
        let classes = assign_unique(&class_items, type_scope);

        // Idents must not shadow an imported class inside a group function.
        group_scope.extend(classes.iter().cloned());
        let ident_items: Vec<(String, String)> = set
            .iter()
            .map(|(id, desc)| {
                let base = ident_base(&desc.name);
                let group = lower_first(&groups[set.group_of(id).index()].pascal);
                (base, format!("{}{}", group, upper_first(&ident_base(&desc.name))))
            })
            .collect();
        let idents = assign_idents(&ident_items, group_scope);

        let mut export_keys = vec![String::new(); set.len()];
        for group in set.group_ids() {
            let members = set.members(group);
            let items: Vec<(String, String)> = members
                .iter()
                .map(|&id| {
                    let desc = set.get(id);
                    let key = desc.contract().unwrap_or(&desc.name).to_string();
                    (key, desc.name.clone())
                })
                .collect();
            for (&id, key) in members.iter().zip(assign_unique(&items, HashSet::new())) {
                export_keys[id.index()] = key;
            }
        }

        let components = idents
            .into_iter()
            .zip(classes)
            .zip(export_keys)
            .map(|((ident, class_alias), export_key)| ComponentNames {
                ident,
                class_alias,
                export_key,
            })
            .collect();

        NameTable { components, groups }
    }

    pub fn component(&self, id: ComponentId) -> &ComponentNames {
        &self.components[id.index()]
    }

    pub fn group(&self, group: GroupId) -> &GroupNames {
        &self.groups[group.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{component, grouped, set_of};

    #[test]
    fn test_ident_base() {
        assert_eq!(ident_base("UserService"), "userService");
        assert_eq!(ident_base("http-client"), "httpclient");
        assert_eq!(ident_base("$Store_2"), "store2");
        assert_eq!(ident_base("3D"), "_3D");
        assert_eq!(ident_base("Default"), "defaultComponent");
        assert_eq!(ident_base("---"), "component");
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(pascal_case("web-app"), "WebApp");
        assert_eq!(pascal_case("core"), "Core");
        assert_eq!(kebab_case("WebApp"), "web-app");
        assert_eq!(kebab_case("web_app"), "web-app");
        assert_eq!(kebab_case("HTTPServer"), "httpserver");
        assert_eq!(kebab_case("v2Api"), "v2-api");
    }

    #[test]
    fn test_property_access() {
        assert_eq!(property_access("coreGroup", "IClock"), "coreGroup.IClock");
        assert_eq!(property_access("coreGroup", "user-repo"), "coreGroup[\"user-repo\"]");
        assert_eq!(property_name("user-repo"), "\"user-repo\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_unique_names_untouched() {
        let set = set_of(vec![component("UserService").unique(), component("Clock").contract("IClock")]);
        let names = NameTable::build(&set, &["container"]);

        let user = names.component(ComponentId(0));
        assert_eq!(user.ident, "userService");
        assert_eq!(user.factory(), "userServiceFactory");
        assert_eq!(user.class_alias, "UserService");
        assert_eq!(user.export_key, "UserService");

        let clock = names.component(ComponentId(1));
        assert_eq!(clock.accessor(), "getClock");
        assert_eq!(clock.export_key, "IClock");
    }

    #[test]
    fn test_collisions_across_groups_use_group_discriminator() {
        let set = grouped(vec![
            ("core", vec![component("Logger")]),
            ("web", vec![component("Logger")]),
        ]);
        let names = NameTable::build(&set, &["container"]);

        assert_eq!(names.component(ComponentId(0)).ident, "coreLogger");
        assert_eq!(names.component(ComponentId(1)).ident, "webLogger");
        assert_eq!(names.component(ComponentId(0)).class_alias, "CoreLogger");
        assert_eq!(names.component(ComponentId(1)).class_alias, "WebLogger");
        // export keys are per group and need no disambiguation
        assert_eq!(names.component(ComponentId(1)).export_key, "Logger");
    }

    #[test]
    fn test_collisions_within_group_use_numeric_suffix() {
        let set = set_of(vec![
            component("Repo").source("src/a/repo.ts"),
            component("Repo").source("src/b/repo.ts"),
        ]);
        let names = NameTable::build(&set, &["container"]);

        assert_eq!(names.component(ComponentId(0)).ident, "mainRepo");
        assert_eq!(names.component(ComponentId(1)).ident, "mainRepo2");
        assert_eq!(names.component(ComponentId(0)).export_key, "Repo");
        assert_eq!(names.component(ComponentId(1)).export_key, "Repo2");
    }

    #[test]
    fn test_idents_avoid_derived_accessor_names() {
        let set = set_of(vec![component("Foo"), component("GetFoo")]);
        let names = NameTable::build(&set, &["container"]);

        let foo = names.component(ComponentId(0));
        let get_foo = names.component(ComponentId(1));
        assert_eq!(foo.accessor(), "getFoo");
        assert_eq!(get_foo.ident, "mainGetFoo");
        assert_eq!(get_foo.accessor(), "getMainGetFoo");
    }

    #[test]
    fn test_idents_avoid_derived_factory_names() {
        let set = set_of(vec![component("Foo").unique(), component("FooFactory")]);
        let names = NameTable::build(&set, &["container"]);

        assert_eq!(names.component(ComponentId(0)).factory(), "fooFactory");
        assert_eq!(names.component(ComponentId(1)).ident, "mainFooFactory");
    }

    #[test]
    fn test_derived_names_are_pairwise_distinct() {
        let set = set_of(vec![
            component("GetFoo"),
            component("Foo"),
            component("FooFactory").unique(),
            component("Bar").unique(),
            component("BarFactory"),
            component("getBar"),
        ]);
        let names = NameTable::build(&set, &["container"]);

        let mut seen = HashSet::new();
        for i in 0..set.len() {
            for name in declared_names(&names.component(ComponentId(i)).ident) {
                assert!(seen.insert(name.clone()), "`{}` declared twice", name);
            }
        }
    }

    #[test]
    fn test_class_named_container_is_aliased() {
        let set = set_of(vec![component("Container"), component("container")]);
        let names = NameTable::build(&set, &["container"]);

        assert_eq!(names.component(ComponentId(0)).class_alias, "MainContainer");
        assert_eq!(names.component(ComponentId(1)).class_alias, "MainContainer2");
    }

    #[test]
    fn test_group_names() {
        let set = grouped(vec![("web-app", vec![]), ("container", vec![])]);
        let names = NameTable::build(&set, &["container"]);

        let web = names.group(GroupId(0));
        assert_eq!(web.function(), "createWebAppGroup");
        assert_eq!(web.type_name(), "WebAppGroup");
        assert_eq!(web.instance(), "webAppGroup");
        assert_eq!(web.file_stem, "web-app");

        assert_eq!(names.group(GroupId(1)).file_stem, "container-group");
    }

    #[test]
    fn test_component_avoids_group_instance_name() {
        let set = grouped(vec![("core", vec![component("CoreGroup")])]);
        let names = NameTable::build(&set, &[]);
        assert_eq!(names.component(ComponentId(0)).ident, "coreCoreGroup");
        assert_eq!(names.component(ComponentId(0)).class_alias, "CoreCoreGroup");
    }
}
