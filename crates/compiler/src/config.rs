//! Compilation options, read from the `[options]` table of a scenario and
//! overridable from the command line.

use fixbuf_compiler_semantic::{MemberTable, UnknownMember, WellKnownMember};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Well-known members the target environment does not provide, by
    /// configuration name (`span-slice`) or qualified name
    pub missing_members: Vec<String>,
    /// Interpret the entry method after lowering
    pub run: bool,
    /// Method to interpret, `Main` when absent
    pub entry: Option<String>,
}

impl CompilerOptions {
    pub const DEFAULT_ENTRY: &'static str = "Main";

    pub fn entry(&self) -> &str {
        self.entry.as_deref().unwrap_or(Self::DEFAULT_ENTRY)
    }

    /// Add members to the missing list, skipping the ones already there
    pub fn add_missing_members(&mut self, members: impl IntoIterator<Item = String>) {
        for member in members {
            if !self.missing_members.contains(&member) {
                self.missing_members.push(member);
            }
        }
    }

    /// Build the host capability table these options describe
    pub fn member_table(&self) -> Result<MemberTable, UnknownMember> {
        let missing = self
            .missing_members
            .iter()
            .map(|name| name.parse::<WellKnownMember>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MemberTable::with_missing(missing))
    }
}
