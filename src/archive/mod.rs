mod writer;

pub use writer::ZipSink;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::jobs::{Flow, JobNode, Project, Properties};

/// Build `<out_dir>/<project>.zip` from the project's flows.
///
/// The output directory is created if missing. An existing archive is only
/// replaced when `overwrite` is set; otherwise the build fails before any
/// byte is written. A failed build may leave a truncated archive behind;
/// retry into a fresh path rather than resuming.
pub fn build(project: &Project, out_dir: impl AsRef<Path>, overwrite: bool) -> Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(project.archive_filename());
    if path.exists() && !overwrite {
        return Err(Error::PathExists(path));
    }

    let mut sink = ZipSink::create(&path)?;
    for flow in project.flows() {
        write_flow(&mut sink, flow, &format!("{}/{}", project.name(), flow.name()))?;
    }
    if let Some(properties) = project.properties() {
        write_properties(&mut sink, properties, project.name())?;
    }
    sink.finish()?;
    info!(archive = %path.display(), "Project archive written");
    Ok(path)
}

/// Serialize one flow under `basedir`, recursing into sub-flow directories.
/// The flow must have exactly one terminal job; more than one means a graph
/// mutation bypassed the engine.
fn write_flow(sink: &mut ZipSink, flow: &Flow, basedir: &str) -> Result<()> {
    let terminals = flow.last_jobs();
    if terminals.len() != 1 {
        return Err(Error::MultipleTerminal {
            flow: flow.name().to_string(),
            count: terminals.len(),
        });
    }
    for job in flow.jobs() {
        let text = flow.job_text(job.name())?;
        sink.write_text(&format!("{}/{}", basedir, job.filename()), &text)?;
        if let JobNode::Flow(sub) = job {
            write_flow(sink, sub, &format!("{}/{}", basedir, sub.name()))?;
        }
    }
    if let Some(properties) = flow.properties() {
        write_properties(sink, properties, basedir)?;
    }
    debug!(flow = flow.name(), basedir, "Flow serialized");
    Ok(())
}

fn write_properties(sink: &mut ZipSink, properties: &Properties, basedir: &str) -> Result<()> {
    sink.write_text(&format!("{}/{}", basedir, properties.filename()), &properties.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{Command, Flow, Project};

    #[test]
    fn build_rejects_flow_with_two_terminal_jobs() {
        let mut flow = Flow::new("broken");
        flow.register(Command::new("a", "echo a")).expect("register a");
        flow.register(Command::new("b", "echo b")).expect("register b");
        flow.add_dependency("a", "b").expect("wire a -> b");

        // Bypass the protected mutation path so `a` loses its only
        // outgoing edge and the graph grows a second terminal.
        flow.sever_dependency("a", "b");
        assert_eq!(flow.last_jobs().len(), 2);

        let mut project = Project::new("p", "broken graph");
        project.add_flow(flow).expect("add flow");

        let dir = tempfile::tempdir().expect("temp dir");
        let err = build(&project, dir.path(), false).expect_err("build must fail");
        assert!(matches!(err, Error::MultipleTerminal { count: 2, .. }));
    }
}
