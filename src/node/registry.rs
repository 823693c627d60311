//! The node catalogue
//!
//! Each [`NodeKind`] carries the metadata a host needs to register it: class
//! name, display name, menu category, output names, and whether the host must
//! run it on every pass.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::NodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    DiceRoller,
    LineCounter,
    LineSelect,
    LogFile,
    LogReader,
    Modulo,
    ModuloAdvanced,
    ShotHelper,
    GraphPlotter,
    StoryDriver,
    SaveData,
    ReadData,
    ShowData,
    CustomDropdown,
}

impl NodeKind {
    pub const ALL: [NodeKind; 14] = [
        NodeKind::DiceRoller,
        NodeKind::LineCounter,
        NodeKind::LineSelect,
        NodeKind::LogFile,
        NodeKind::LogReader,
        NodeKind::Modulo,
        NodeKind::ModuloAdvanced,
        NodeKind::ShotHelper,
        NodeKind::GraphPlotter,
        NodeKind::StoryDriver,
        NodeKind::SaveData,
        NodeKind::ReadData,
        NodeKind::ShowData,
        NodeKind::CustomDropdown,
    ];

    /// Class name the host registers the node under
    pub fn class_name(self) -> &'static str {
        match self {
            NodeKind::DiceRoller => "MF_DiceRoller",
            NodeKind::LineCounter => "MF_LineCounter",
            NodeKind::LineSelect => "MF_LineSelect",
            NodeKind::LogFile => "MF_LogFile",
            NodeKind::LogReader => "MF_LogReader",
            NodeKind::Modulo => "MF_Modulo",
            NodeKind::ModuloAdvanced => "MF_ModuloAdvanced",
            NodeKind::ShotHelper => "MF_ShotHelper",
            NodeKind::GraphPlotter => "MF_GraphPlotter",
            NodeKind::StoryDriver => "MF_StoryDriver",
            NodeKind::SaveData => "MF_SaveData",
            NodeKind::ReadData => "MF_ReadData",
            NodeKind::ShowData => "MF_ShowData",
            NodeKind::CustomDropdown => "MF_CustomDropdownMenu",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::DiceRoller => "MF Dice Roller",
            NodeKind::LineCounter => "MF Line Counter",
            NodeKind::LineSelect => "MF Line Select",
            NodeKind::LogFile => "MF Log File",
            NodeKind::LogReader => "MF Log Reader",
            NodeKind::Modulo => "MF Modulo",
            NodeKind::ModuloAdvanced => "MF Modulo Advanced",
            NodeKind::ShotHelper => "MF Shot Helper",
            NodeKind::GraphPlotter => "MF Graph Plotter",
            NodeKind::StoryDriver => "MF Story Driver",
            NodeKind::SaveData => "MF Save Data",
            NodeKind::ReadData => "MF Read Data",
            NodeKind::ShowData => "MF Show Data",
            NodeKind::CustomDropdown => "MF Custom Dropdown Menu",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            NodeKind::DiceRoller => "MF_PipoNodes/Random",
            NodeKind::LineCounter | NodeKind::LineSelect | NodeKind::CustomDropdown => {
                "MF_PipoNodes/Utilities"
            }
            NodeKind::LogFile | NodeKind::LogReader => "MF_PipoNodes/Logging",
            NodeKind::Modulo | NodeKind::ModuloAdvanced => "MF_PipoNodes/Math",
            NodeKind::ShotHelper | NodeKind::StoryDriver => "MF_PipoNodes/Sequencing",
            NodeKind::GraphPlotter => "MF_PipoNodes/Analysis",
            NodeKind::SaveData | NodeKind::ReadData | NodeKind::ShowData => "MF Data",
        }
    }

    /// Names of the result slots, in order
    pub fn return_names(self) -> &'static [&'static str] {
        match self {
            NodeKind::DiceRoller => &["int", "string"],
            NodeKind::LineCounter => &["line_count_int", "line_count_str"],
            NodeKind::LineSelect => &["selected_line"],
            NodeKind::LogFile | NodeKind::LogReader => &["log_content"],
            NodeKind::Modulo => &["result_int", "result_string"],
            NodeKind::ModuloAdvanced => &[
                "modulo_result_int",
                "modulo_result_string",
                "cycle_count_int",
                "cycle_count_string",
            ],
            NodeKind::ShotHelper => &["sequence_int", "sequence_str", "shot_int", "shot_str", "shot_name"],
            NodeKind::GraphPlotter => &["X", "Y"],
            NodeKind::StoryDriver => &["step_int", "step_str", "projectName", "saveFolder", "storySeed"],
            NodeKind::SaveData => &["filepath"],
            NodeKind::ReadData | NodeKind::ShowData => &["data"],
            NodeKind::CustomDropdown => &["selected_value"],
        }
    }

    /// Whether the node produces a side effect or display the host must keep
    pub fn is_output_node(self) -> bool {
        !matches!(
            self,
            NodeKind::LineCounter
                | NodeKind::LineSelect
                | NodeKind::ShotHelper
                | NodeKind::ReadData
                | NodeKind::CustomDropdown
        )
    }

    /// The node has no memoizable result; the host must run it every pass
    pub fn always_execute(self) -> bool {
        matches!(
            self,
            NodeKind::DiceRoller
                | NodeKind::LogFile
                | NodeKind::LogReader
                | NodeKind::Modulo
                | NodeKind::ModuloAdvanced
                | NodeKind::GraphPlotter
                | NodeKind::StoryDriver
        )
    }

    pub fn info(self) -> NodeInfo {
        NodeInfo {
            class_name: self.class_name(),
            display_name: self.display_name(),
            category: self.category(),
            outputs: self.return_names(),
            output_node: self.is_output_node(),
            always_execute: self.always_execute(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for NodeKind {
    type Err = NodeError;

    /// Accepts the class name or the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.class_name() == s || kind.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| NodeError::UnknownNode(s.to_string()))
    }
}

/// Registration metadata for one node
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub outputs: &'static [&'static str],
    pub output_node: bool,
    pub always_execute: bool,
}
