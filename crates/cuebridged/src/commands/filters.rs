//! Source filter management.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::{Filter, FilterMovement, Settings, merge};

use super::{CommandError, CommandResult, Params, done, fields};

fn filter_json(filter: &Filter) -> Value {
    json!({
        "enabled": filter.enabled,
        "type": filter.type_id,
        "name": filter.name,
        "settings": filter.settings,
    })
}

pub(super) fn get_source_filters(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("sourceName")?;
    context.studio.with_studio(|studio| {
        let filters: Vec<Value> = studio.source(name)?.filters.iter().map(filter_json).collect();
        Ok(fields(json!({ "filters": filters })))
    })
}

pub(super) fn get_source_filter_info(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let filter = params.str("filterName")?;
    context
        .studio
        .with_studio(|studio| Ok(fields(filter_json(studio.filter(source, filter)?))))
}

pub(super) fn add_filter_to_source(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    let type_id = params.str("filterType")?;
    let settings = params.opt_object("filterSettings")?.cloned().unwrap_or_default();
    context
        .studio
        .with_studio(|studio| studio.add_filter(source, name, type_id, settings))?;
    done()
}

pub(super) fn remove_filter_from_source(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    context
        .studio
        .with_studio(|studio| studio.remove_filter(source, name))?;
    done()
}

pub(super) fn reorder_source_filter(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    let index = usize::try_from(params.u64("newIndex")?)
        .map_err(|_| CommandError::invalid("newIndex", "index is too large"))?;
    context
        .studio
        .with_studio(|studio| studio.reorder_filter(source, name, index))?;
    done()
}

pub(super) fn move_source_filter(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    let movement: FilterMovement = params
        .str("movementType")?
        .parse()
        .map_err(|reason: String| CommandError::invalid("movementType", reason))?;
    context
        .studio
        .with_studio(|studio| studio.move_filter(source, name, movement))?;
    done()
}

pub(super) fn set_source_filter_settings(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    let settings: &Settings = params.object("filterSettings")?;
    context.studio.with_studio(|studio| {
        merge(&mut studio.filter_mut(source, name)?.settings, settings);
        done()
    })
}

pub(super) fn set_source_filter_visibility(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let source = params.str("sourceName")?;
    let name = params.str("filterName")?;
    let enabled = params.bool("filterEnabled")?;
    context.studio.with_studio(|studio| {
        studio.filter_mut(source, name)?.enabled = enabled;
        done()
    })
}
