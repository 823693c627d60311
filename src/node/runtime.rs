//! Node dispatch

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{NodeError, NodeKind, NodeOutput, NodeRequest, NodeResponse};
use crate::codec::{self, DataFormat};
use crate::domain::{dice, dropdown, modulo, shot, text, CycleCounter, Die};
use crate::storage::{logfile, node_key, Config, PointSeriesStore, ProjectStore, DEFAULT_PROJECT};

const SHOW_DATA_RULE: &str = "==================================================";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn default_line_text() -> String {
    "Line 1\nLine 2\nLine 3".to_string()
}

fn default_log_name() -> String {
    logfile::DEFAULT_LOG_NAME.to_string()
}

fn default_modulus() -> i64 {
    10
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_data_name() -> String {
    "data".to_string()
}

fn default_read_name() -> String {
    "data.json".to_string()
}

fn default_selection() -> String {
    "medium".to_string()
}

fn default_options() -> String {
    dropdown::DEFAULT_OPTIONS.to_string()
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiceInputs {
    dice: Die,
}

#[derive(Debug, Deserialize)]
struct LineCounterInputs {
    #[serde(default = "default_line_text")]
    text: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LineSelectInputs {
    text: String,
    line_index: i64,
}

#[derive(Debug, Deserialize)]
struct LogFileInputs {
    #[serde(default)]
    log_entry: String,
    #[serde(default)]
    save_log_path: String,
    #[serde(default = "default_log_name")]
    log_file_name: String,
}

#[derive(Debug, Deserialize)]
struct LogReaderInputs {
    #[serde(default)]
    log_file_path: String,
    #[serde(default = "default_log_name")]
    log_file_name: String,
}

#[derive(Debug, Deserialize)]
struct ModuloInputs {
    #[serde(default)]
    input_number: i64,
    #[serde(default = "default_modulus")]
    modulo_value: i64,
    #[serde(default)]
    reset_cycles: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ShotInputs {
    step: i64,
    beats: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PlotInputs {
    #[serde(rename = "X")]
    x: i64,
    #[serde(rename = "Y")]
    y: i64,
}

#[derive(Debug, Deserialize)]
struct StoryInputs {
    #[serde(rename = "projectName", default = "default_project")]
    project_name: String,
    #[serde(default = "default_true")]
    randomize_seed_on_reset: bool,
}

#[derive(Debug, Deserialize)]
struct SaveDataInputs {
    #[serde(default)]
    data: String,
    #[serde(default)]
    output_path: String,
    #[serde(default = "default_data_name")]
    filename: String,
    #[serde(default)]
    format: DataFormat,
}

#[derive(Debug, Deserialize)]
struct ReadDataInputs {
    #[serde(default)]
    file_path: String,
    #[serde(default = "default_read_name")]
    filename: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ShowDataInputs {
    data: String,
}

#[derive(Debug, Deserialize)]
struct DropdownInputs {
    #[serde(default = "default_selection")]
    selection: String,
    #[serde(default = "default_options")]
    dropdown_options: String,
}

fn parse_inputs<T: DeserializeOwned>(kind: NodeKind, inputs: &Value) -> Result<T, NodeError> {
    let empty = Value::Object(Map::new());
    let inputs = if inputs.is_null() { &empty } else { inputs };
    T::deserialize(inputs).map_err(|source| NodeError::InvalidInputs { node: kind, source })
}

/// Runs nodes against shared state
///
/// One runtime serves every invocation in a process, so the per-instance
/// cycle counters and the snapshot stores persist across passes.
#[derive(Debug)]
pub struct NodeRuntime {
    output_dir: PathBuf,
    points: PointSeriesStore,
    projects: ProjectStore,
    counters: Mutex<HashMap<String, CycleCounter>>,
    rng: Mutex<StdRng>,
}

impl NodeRuntime {
    pub fn new(output_dir: impl Into<PathBuf>, points: PointSeriesStore, projects: ProjectStore) -> Self {
        Self {
            output_dir: output_dir.into(),
            points,
            projects,
            counters: Mutex::new(HashMap::new()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Opens the snapshot stores in the configured state directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output_dir.clone(),
            PointSeriesStore::open(config.points_path()),
            ProjectStore::open(config.projects_path()),
        )
    }

    /// Replaces the dice random source
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn points(&self) -> &PointSeriesStore {
        &self.points
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    fn dir_or_output(&self, dir: &str) -> PathBuf {
        match dir.trim() {
            "" => self.output_dir.clone(),
            dir => PathBuf::from(dir),
        }
    }

    /// Runs one request, turning any failure into an error response
    pub fn execute(&self, request: &NodeRequest) -> NodeResponse {
        let result = request
            .node
            .parse::<NodeKind>()
            .and_then(|kind| self.run(kind, request.unique_id.as_deref(), &request.inputs));

        match result {
            Ok(output) => NodeResponse::success(output),
            Err(e) => {
                tracing::warn!(node = %request.node, error = %e, "Node request failed");
                NodeResponse::error(e.to_string())
            }
        }
    }

    /// Runs `kind` with `inputs`
    pub fn run(&self, kind: NodeKind, unique_id: Option<&str>, inputs: &Value) -> Result<NodeOutput, NodeError> {
        tracing::debug!(node = %kind, unique_id = ?unique_id, "Running node");

        let output = match kind {
            NodeKind::DiceRoller => {
                let inputs: DiceInputs = parse_inputs(kind, inputs)?;
                let result = inputs.dice.roll(&mut *lock(&self.rng));
                tracing::info!(dice = %inputs.dice, result, "Rolled dice");
                NodeOutput::new(vec![json!(result), json!(result.to_string())])
                    .with_ui("text", dice::roll_display(result))
            }

            NodeKind::LineCounter => {
                let inputs: LineCounterInputs = parse_inputs(kind, inputs)?;
                let count = text::count_lines(&inputs.text);
                NodeOutput::new(vec![json!(count), json!(count.to_string())])
            }

            NodeKind::LineSelect => {
                let inputs: LineSelectInputs = parse_inputs(kind, inputs)?;
                let line = text::select_line(&inputs.text, inputs.line_index).unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    e.to_string()
                });
                NodeOutput::new(vec![json!(line)])
            }

            NodeKind::LogFile => {
                let inputs: LogFileInputs = parse_inputs(kind, inputs)?;
                let content = logfile::write_log(
                    &inputs.log_entry,
                    &inputs.save_log_path,
                    &inputs.log_file_name,
                    &self.output_dir,
                );
                NodeOutput::new(vec![json!(content.clone())]).with_ui("log_display", content)
            }

            NodeKind::LogReader => {
                let inputs: LogReaderInputs = parse_inputs(kind, inputs)?;
                let content =
                    logfile::read_log(&inputs.log_file_path, &inputs.log_file_name, &self.output_dir);
                NodeOutput::new(vec![json!(content.clone())]).with_ui("log_display", content)
            }

            NodeKind::Modulo => {
                let inputs: ModuloInputs = parse_inputs(kind, inputs)?;
                let outcome = modulo::modulo(inputs.input_number, inputs.modulo_value)?;
                tracing::info!("{}", outcome.display_text());
                NodeOutput::new(vec![json!(outcome.result), json!(outcome.result.to_string())])
                    .with_ui("text", outcome.display_text())
            }

            NodeKind::ModuloAdvanced => {
                let inputs: ModuloInputs = parse_inputs(kind, inputs)?;
                let outcome = lock(&self.counters)
                    .entry(node_key(unique_id).to_string())
                    .or_default()
                    .apply(inputs.input_number, inputs.modulo_value, inputs.reset_cycles)?;
                tracing::info!(cycle = outcome.cycle_count, "{}", outcome.modulo.display_text());
                NodeOutput::new(vec![
                    json!(outcome.modulo.result),
                    json!(outcome.modulo.result.to_string()),
                    json!(outcome.cycle_count),
                    json!(outcome.cycle_count.to_string()),
                ])
                .with_ui("text", outcome.display_text())
            }

            NodeKind::ShotHelper => {
                let inputs: ShotInputs = parse_inputs(kind, inputs)?;
                let position = shot::calculate(inputs.step, &inputs.beats);
                let name = position.shot_name();
                tracing::info!(step = inputs.step, shot = %name, "Located shot");
                NodeOutput::new(vec![
                    json!(position.sequence),
                    json!(position.sequence.to_string()),
                    json!(position.shot),
                    json!(position.shot.to_string()),
                    json!(name),
                ])
            }

            NodeKind::GraphPlotter => {
                let inputs: PlotInputs = parse_inputs(kind, inputs)?;
                let update = self.points.append(unique_id, inputs.x, inputs.y);
                tracing::info!(point = update.point_count, x = inputs.x, y = inputs.y, "Plotted point");
                let graph_data = json!({
                    "x_values": update.x_values,
                    "y_values": update.y_values,
                    "node_id": update.node_id,
                    "point_count": update.point_count,
                });
                NodeOutput::new(vec![json!(inputs.x), json!(inputs.y)]).with_ui("graph_data", graph_data)
            }

            NodeKind::StoryDriver => {
                let inputs: StoryInputs = parse_inputs(kind, inputs)?;
                let frame = self.projects.advance(&inputs.project_name);
                tracing::info!(
                    project = %inputs.project_name,
                    step = frame.step,
                    seed = frame.seed,
                    "Story step"
                );
                NodeOutput::new(vec![
                    json!(frame.step),
                    json!(frame.step.to_string()),
                    json!(frame.project_name),
                    json!(frame.save_folder),
                    json!(frame.seed),
                ])
                .with_ui("status_display", format!("Step: {} | Seed: {}", frame.step, frame.seed))
                .with_ui("randomize_seed", inputs.randomize_seed_on_reset)
            }

            NodeKind::SaveData => {
                let inputs: SaveDataInputs = parse_inputs(kind, inputs)?;
                let dir = self.dir_or_output(&inputs.output_path);
                let path = codec::save_data(&inputs.data, &dir, &inputs.filename, inputs.format);
                NodeOutput::new(vec![json!(path)])
            }

            NodeKind::ReadData => {
                let inputs: ReadDataInputs = parse_inputs(kind, inputs)?;
                let dir = self.dir_or_output(&inputs.file_path);
                NodeOutput::new(vec![json!(codec::read_data(&dir, &inputs.filename))])
            }

            NodeKind::ShowData => {
                let inputs: ShowDataInputs = parse_inputs(kind, inputs)?;
                let data = text::strip_code_fence(&inputs.data);
                let banner = format!("{0}\n[MF Show Data]\n{0}\n{1}\n{0}", SHOW_DATA_RULE, data);
                tracing::info!("\n{}", banner);
                NodeOutput::new(vec![json!(data.clone())]).with_ui("text", data)
            }

            NodeKind::CustomDropdown => {
                let inputs: DropdownInputs = parse_inputs(kind, inputs)?;
                let options = dropdown::parse_options(&inputs.dropdown_options);
                if !options.contains(&inputs.selection) {
                    tracing::debug!(selection = %inputs.selection, "Selection is not among the options");
                }
                NodeOutput::new(vec![json!(inputs.selection)])
            }
        };

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn runtime(dir: &TempDir) -> NodeRuntime {
        NodeRuntime::new(
            dir.path().join("output"),
            PointSeriesStore::open(dir.path().join("state").join("graph_plotter_state.json")),
            ProjectStore::with_rng(
                dir.path().join("state").join("story_driver_state.json"),
                StdRng::seed_from_u64(11),
            ),
        )
        .with_rng(StdRng::seed_from_u64(3))
    }

    fn run(rt: &NodeRuntime, node: &str, id: Option<&str>, inputs: Value) -> NodeOutput {
        let mut request = NodeRequest::new(node, inputs);
        request.unique_id = id.map(str::to_string);
        let response = rt.execute(&request);
        assert!(response.success, "{:?}", response.error);
        response.data.unwrap()
    }

    #[test]
    fn unknown_node_fails() {
        let dir = TempDir::new().unwrap();
        let response = runtime(&dir).execute(&NodeRequest::new("MF_Nope", json!({})));
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Unknown node 'MF_Nope'"));
    }

    #[test]
    fn bad_input_shape_fails() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);
        let response = rt.execute(&NodeRequest::new("MF_Modulo", json!({"input_number": "seven"})));
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Invalid inputs for MF_Modulo"));

        let response = rt.execute(&NodeRequest::new("MF_DiceRoller", json!({"dice": "D7"})));
        assert!(!response.success);
    }

    #[test]
    fn zero_modulus_is_rejected() {
        let dir = TempDir::new().unwrap();
        let response = runtime(&dir).execute(&NodeRequest::new(
            "MF_ModuloAdvanced",
            json!({"input_number": 3, "modulo_value": 0}),
        ));
        assert!(!response.success);
        assert!(response.error.unwrap().contains("at least 1"));
    }

    #[test]
    fn dice_rolls_in_range() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);
        for _ in 0..50 {
            let out = run(&rt, "MF_DiceRoller", None, json!({"dice": "D4"}));
            let n = out.result[0].as_u64().unwrap();
            assert!((1..=4).contains(&n));
            assert_eq!(out.result[1], json!(n.to_string()));
            assert_eq!(out.ui.unwrap()["text"], json!([format!("🎲 {}", n)]));
        }
    }

    #[test]
    fn line_nodes() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);

        assert_eq!(run(&rt, "MF_LineCounter", None, json!({})).result, vec![json!(3), json!("3")]);
        assert_eq!(run(&rt, "MF_LineCounter", None, json!({"text": "  \n "})).result[0], json!(0));

        let out = run(&rt, "MF_LineSelect", None, json!({"text": "a\r\nb\n\nc", "line_index": 3}));
        assert_eq!(out.result, vec![json!("c")]);

        let out = run(&rt, "MF_LineSelect", None, json!({"text": "a\nb", "line_index": 5}));
        assert_eq!(out.result, vec![json!("⚠️ Line index 5 out of range (0-1)")]);

        let out = run(&rt, "MF_LineSelect", None, json!({"text": "a\nb", "line_index": -1}));
        assert_eq!(out.result, vec![json!("⚠️ Line index -1 out of range (0-1)")]);
    }

    #[test]
    fn modulo_nodes() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);

        let out = run(&rt, "MF_Modulo", None, json!({"input_number": -3, "modulo_value": 5}));
        assert_eq!(out.result, vec![json!(2), json!("2")]);
        assert_eq!(out.ui.unwrap()["text"], json!(["🔢 -3 mod 5 = 2"]));

        let first = run(&rt, "MF_ModuloAdvanced", Some("9"), json!({"input_number": 25, "modulo_value": 10}));
        assert_eq!(first.result, vec![json!(5), json!("5"), json!(2), json!("2")]);

        let next = run(&rt, "MF_ModuloAdvanced", Some("9"), json!({"input_number": 31, "modulo_value": 10}));
        assert_eq!(next.result[2], json!(3));
        assert_eq!(next.ui.unwrap()["text"], json!(["🔢 31 mod 10 = 1\n🔄 Cycle: 3"]));

        let other = run(&rt, "MF_ModuloAdvanced", Some("10"), json!({"input_number": 5, "modulo_value": 10}));
        assert_eq!(other.result[2], json!(0));

        let reset = run(
            &rt,
            "MF_ModuloAdvanced",
            Some("9"),
            json!({"input_number": 47, "modulo_value": 10, "reset_cycles": true}),
        );
        assert_eq!(reset.result[2], json!(4));
    }

    #[test]
    fn shot_helper_outputs() {
        let dir = TempDir::new().unwrap();
        let out = run(&runtime(&dir), "MF_ShotHelper", None, json!({"step": 20, "beats": "[3, 8, 15]"}));
        assert_eq!(
            out.result,
            vec![json!(4), json!("4"), json!(6), json!("6"), json!("seq04_shot06")]
        );
        assert!(out.ui.is_none());
    }

    #[test]
    fn graph_plotter_accumulates() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);
        run(&rt, "MF_GraphPlotter", Some("5"), json!({"X": 1, "Y": 10}));
        let out = run(&rt, "MF_GraphPlotter", Some("5"), json!({"X": 2, "Y": 20}));

        assert_eq!(out.result, vec![json!(2), json!(20)]);
        assert_eq!(
            out.ui.unwrap()["graph_data"],
            json!([{"x_values": [1, 2], "y_values": [10, 20], "node_id": "5", "point_count": 2}])
        );
        assert!(dir.path().join("state").join("graph_plotter_state.json").exists());
    }

    #[test]
    fn story_driver_steps() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);
        let first = run(&rt, "MF_StoryDriver", None, json!({"projectName": "Red Moon"}));
        let second = run(&rt, "MF_StoryDriver", None, json!({"projectName": "Red Moon"}));

        assert_eq!(first.result[0], json!(0));
        assert_eq!(second.result[0], json!(1));
        assert_eq!(second.result[1], json!("1"));
        assert_eq!(second.result[2], json!("Red_Moon"));
        assert_eq!(first.result[4], second.result[4]);

        let seed = second.result[4].as_u64().unwrap();
        assert_eq!(second.result[3], json!(format!("Red_Moon_{}", seed)));
        assert_eq!(
            second.ui.unwrap()["status_display"],
            json!([format!("Step: 1 | Seed: {}", seed)])
        );
    }

    #[test]
    fn data_nodes_use_output_dir() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);

        let saved = run(&rt, "MF_SaveData", None, json!({"data": "[{\"a\": 1}]", "format": "csv"}));
        let path = dir.path().join("output").join("data.csv");
        assert_eq!(saved.result, vec![json!(path.display().to_string())]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\n1\r\n");

        let read = run(&rt, "MF_ReadData", None, json!({"filename": "data.csv"}));
        let value: Value = serde_json::from_str(read.result[0].as_str().unwrap()).unwrap();
        assert_eq!(value, json!([{"a": "1"}]));

        let missing = run(&rt, "MF_ReadData", None, json!({}));
        assert!(missing.result[0].as_str().unwrap().starts_with("File not found: "));
    }

    #[test]
    fn log_nodes_round_trip() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);

        let written = run(&rt, "MF_LogFile", None, json!({"log_entry": "render done"}));
        let content = written.result[0].as_str().unwrap().to_string();
        assert!(content.ends_with("] render done\n\n"));
        assert!(dir.path().join("output").join("logfile.txt").exists());

        let read = run(&rt, "MF_LogReader", None, Value::Null);
        assert_eq!(read.result, vec![json!(content)]);
        assert_eq!(read.ui.unwrap()["log_display"], json!([content]));
    }

    #[test]
    fn show_data_strips_fence() {
        let dir = TempDir::new().unwrap();
        let out = run(&runtime(&dir), "MF_ShowData", None, json!({"data": "```yaml\na: 1\n```"}));
        assert_eq!(out.result, vec![json!("a: 1")]);
        assert_eq!(out.ui.unwrap()["text"], json!(["a: 1"]));
    }

    #[test]
    fn dropdown_passes_selection() {
        let dir = TempDir::new().unwrap();
        let rt = runtime(&dir);
        assert_eq!(run(&rt, "MF_CustomDropdownMenu", None, json!({})).result, vec![json!("medium")]);
        assert_eq!(
            run(&rt, "MF_CustomDropdownMenu", None, json!({"selection": "ultra"})).result,
            vec![json!("ultra")]
        );
    }
}
