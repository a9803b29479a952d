//! Generic outputs such as the virtual camera.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::Output;

use super::{CommandResult, Params, done, fields};

fn output_json(output: &Output) -> Value {
    json!({
        "name": output.name,
        "type": output.type_id,
        "width": output.width,
        "height": output.height,
        "settings": output.settings,
        "active": output.active,
        "reconnecting": false,
        "congestion": 0.0,
        "totalFrames": 0,
        "droppedFrames": 0,
        "totalBytes": 0,
    })
}

pub(super) fn list_outputs(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    let outputs: Vec<Value> = context
        .studio
        .with_studio(|studio| studio.outputs.iter().map(output_json).collect());
    Ok(fields(json!({ "outputs": outputs })))
}

pub(super) fn get_output_info(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("outputName")?;
    let info = context
        .studio
        .with_studio(|studio| studio.output(name).map(output_json))?;
    Ok(fields(json!({ "outputInfo": info })))
}

pub(super) fn start_output(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("outputName")?;
    context.studio.with_studio(|studio| studio.start_output(name))?;
    done()
}

/// `force` is accepted for compatibility; in-memory outputs always stop at once.
pub(super) fn stop_output(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("outputName")?;
    params.opt_bool("force")?;
    context.studio.with_studio(|studio| studio.stop_output(name))?;
    done()
}
