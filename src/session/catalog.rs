//! Command catalog.
//!
//! The array describes its own commands through the reserved `help` command.
//! Each entry becomes a [`CommandInfo`] that can be invoked by name through
//! any [`Executor`]; names missing from the catalog stay invokable through
//! [`Executor::invoke`].

use std::collections::BTreeMap;

use super::Executor;
use crate::codec::{Arguments, Response, Value};
use crate::error::Result;
use crate::protocol::wire_format::HELP_COMMAND;

/// One command as described by `help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub syntax: String,
}

impl CommandInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        syntax: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            syntax: syntax.into(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self::new(
            value.field("name")?,
            value.field("description").unwrap_or_default(),
            value.field("syntax").unwrap_or_default(),
        ))
    }

    /// Description followed by the usage line.
    pub fn doc(&self) -> String {
        format!("{}\nUsage: {}", self.description, self.syntax)
    }

    /// Run this command through `executor`.
    pub fn call<E: Executor + ?Sized>(&self, executor: &E, args: &Arguments) -> Result<Response> {
        executor.execute(&self.name, args)
    }
}

/// Commands known to a client, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: BTreeMap<String, CommandInfo>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a `help` response. Entries without a name are
    /// skipped.
    pub fn from_response(response: &Response) -> Result<Self> {
        let mut catalog = Self::new();
        for value in response.as_list()? {
            match CommandInfo::from_value(&value) {
                Some(info) => catalog.register(info),
                None => tracing::debug!("skipping help entry without a name"),
            }
        }
        Ok(catalog)
    }

    /// Run `help` through `executor` and collect the result.
    pub fn fetch<E: Executor + ?Sized>(executor: &E) -> Result<Self> {
        let response = executor.execute(HELP_COMMAND, &Arguments::new())?;
        let catalog = Self::from_response(&response)?;
        tracing::debug!("Populated {} commands", catalog.len());
        Ok(catalog)
    }

    pub fn register(&mut self, info: CommandInfo) {
        self.commands.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&CommandInfo> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandInfo> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Element;

    fn help_response() -> Response {
        let outcome = Element::parse(
            br#"<command><code value="SUCCESS"/><return>
                <command id="1"><name value="vol_list"/><description value="Lists volumes."/>
                    <syntax value="vol_list [ vol=VolName ]"/></command>
                <command id="2"><name value="pool_list"/><description value="Lists pools."/></command>
                <command id="3"><description value="orphan"/></command>
            </return></command>"#,
        )
        .unwrap();
        Response::new(outcome, None)
    }

    #[test]
    fn test_from_response() {
        let catalog = CommandCatalog::from_response(&help_response()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["pool_list", "vol_list"]);
        assert_eq!(catalog.get("pool_list").unwrap().syntax, "");
    }

    #[test]
    fn test_doc_text() {
        let catalog = CommandCatalog::from_response(&help_response()).unwrap();
        let info = catalog.get("vol_list").unwrap();
        assert_eq!(info.doc(), "Lists volumes.\nUsage: vol_list [ vol=VolName ]");
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog = CommandCatalog::new();
        assert!(catalog.is_empty());
        catalog.register(CommandInfo::new("vol_list", "old", ""));
        catalog.register(CommandInfo::new("vol_list", "new", ""));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("vol_list"));
        assert_eq!(catalog.get("vol_list").unwrap().description, "new");
        assert_eq!(catalog.iter().count(), 1);
    }
}
