//! Scene item listing, placement and transform.

use serde_json::{Map, Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::{ItemRef, SceneItem, Studio};

use super::params::item_ref;
use super::{CommandError, CommandResult, Params, done, fields};

/// Bounds types a scene item may use.
const BOUNDS_TYPES: &[&str] = &[
    "OBS_BOUNDS_NONE",
    "OBS_BOUNDS_STRETCH",
    "OBS_BOUNDS_SCALE_INNER",
    "OBS_BOUNDS_SCALE_OUTER",
    "OBS_BOUNDS_SCALE_TO_WIDTH",
    "OBS_BOUNDS_SCALE_TO_HEIGHT",
    "OBS_BOUNDS_MAX_ONLY",
];

fn properties_json(studio: &Studio, item: &SceneItem) -> Value {
    let (width, height) = studio
        .source(&item.source)
        .map_or((studio.video.base_width, studio.video.base_height), |source| {
            (source.width, source.height)
        });
    let transform = &item.transform;
    let muted = studio.source(&item.source).is_ok_and(|source| source.muted);
    json!({
        "itemId": item.id,
        "name": item.source,
        "position": {
            "x": transform.position.x,
            "y": transform.position.y,
            "alignment": transform.position.alignment,
        },
        "rotation": transform.rotation,
        "scale": { "x": transform.scale.x, "y": transform.scale.y },
        "crop": {
            "top": transform.crop.top,
            "right": transform.crop.right,
            "bottom": transform.crop.bottom,
            "left": transform.crop.left,
        },
        "visible": item.visible,
        "muted": muted,
        "locked": item.locked,
        "bounds": {
            "type": transform.bounds.kind,
            "alignment": transform.bounds.alignment,
            "x": transform.bounds.x,
            "y": transform.bounds.y,
        },
        "sourceWidth": width,
        "sourceHeight": height,
        "width": f64::from(width) * transform.scale.x,
        "height": f64::from(height) * transform.scale.y,
    })
}

pub(super) fn get_scene_item_list(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    context.studio.with_studio(|studio| {
        let scene = studio.scene(&params.scene_or_current("sceneName", studio)?)?;
        let items: Vec<Value> = scene
            .items
            .iter()
            .map(|item| {
                let (kind, source_type) = studio
                    .source(&item.source)
                    .map_or(("scene", "scene"), |source| (source.type_id.as_str(), "input"));
                json!({
                    "itemId": item.id,
                    "sourceKind": kind,
                    "sourceName": item.source,
                    "sourceType": source_type,
                })
            })
            .collect();
        Ok(fields(json!({ "sceneName": scene.name, "sceneItems": items })))
    })
}

pub(super) fn set_scene_item_render(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let item = if params.has("item") {
        params.item("item")?
    } else {
        ItemRef::Name(params.str("source")?.to_owned())
    };
    let render = params.bool("render")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        studio.item_mut(&scene, &item)?.visible = render;
        done()
    })
}

pub(super) fn set_scene_item_position(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    let x = params.f64("x")?;
    let y = params.f64("y")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        let position = &mut studio.item_mut(&scene, &item)?.transform.position;
        position.x = x;
        position.y = y;
        done()
    })
}

pub(super) fn set_scene_item_transform(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    let scale_x = params.f64("x-scale")?;
    let scale_y = params.f64("y-scale")?;
    let rotation = params.f64("rotation")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        let transform = &mut studio.item_mut(&scene, &item)?.transform;
        transform.scale.x = scale_x;
        transform.scale.y = scale_y;
        transform.rotation = rotation;
        done()
    })
}

pub(super) fn set_scene_item_crop(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    let (top, bottom, left, right) = (
        params.i64("top")?,
        params.i64("bottom")?,
        params.i64("left")?,
        params.i64("right")?,
    );
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        let crop = &mut studio.item_mut(&scene, &item)?.transform.crop;
        crop.top = top;
        crop.bottom = bottom;
        crop.left = left;
        crop.right = right;
        done()
    })
}

pub(super) fn get_scene_item_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        let item = studio.item(&scene, &item)?;
        Ok(fields(properties_json(studio, item)))
    })
}

/// Applies every property present in the request. Nothing is changed when
/// any property is invalid.
pub(super) fn set_scene_item_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        let target = studio.item_mut(&scene, &item)?;
        let mut updated = target.clone();
        apply_properties(&mut updated, &params)?;
        *target = updated;
        done()
    })
}

fn apply_properties(item: &mut SceneItem, params: &Params<'_>) -> Result<(), CommandError> {
    let transform = &mut item.transform;
    if let Some(position) = params.opt_object("position")? {
        set_if_present(&mut transform.position.x, number(position, "position.x", "x")?);
        set_if_present(&mut transform.position.y, number(position, "position.y", "y")?);
        set_if_present(
            &mut transform.position.alignment,
            alignment(position, "position.alignment")?,
        );
    }
    set_if_present(&mut transform.rotation, params.opt_f64("rotation")?);
    if let Some(scale) = params.opt_object("scale")? {
        set_if_present(&mut transform.scale.x, number(scale, "scale.x", "x")?);
        set_if_present(&mut transform.scale.y, number(scale, "scale.y", "y")?);
    }
    if let Some(crop) = params.opt_object("crop")? {
        set_if_present(&mut transform.crop.top, integer(crop, "crop.top", "top")?);
        set_if_present(&mut transform.crop.bottom, integer(crop, "crop.bottom", "bottom")?);
        set_if_present(&mut transform.crop.left, integer(crop, "crop.left", "left")?);
        set_if_present(&mut transform.crop.right, integer(crop, "crop.right", "right")?);
    }
    if let Some(bounds) = params.opt_object("bounds")? {
        if let Some(kind) = bounds.get("type") {
            let kind = kind
                .as_str()
                .filter(|kind| BOUNDS_TYPES.contains(kind))
                .ok_or_else(|| CommandError::invalid("bounds.type", "unknown bounds type"))?;
            kind.clone_into(&mut transform.bounds.kind);
        }
        set_if_present(&mut transform.bounds.x, number(bounds, "bounds.x", "x")?);
        set_if_present(&mut transform.bounds.y, number(bounds, "bounds.y", "y")?);
        set_if_present(
            &mut transform.bounds.alignment,
            alignment(bounds, "bounds.alignment")?,
        );
    }
    set_if_present(&mut item.visible, params.opt_bool("visible")?);
    set_if_present(&mut item.locked, params.opt_bool("locked")?);
    Ok(())
}

fn set_if_present<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn number(map: &Map<String, Value>, name: &str, key: &str) -> Result<Option<f64>, CommandError> {
    map.get(key)
        .map(|value| {
            value
                .as_f64()
                .ok_or_else(|| CommandError::invalid(name, "expected a number"))
        })
        .transpose()
}

fn integer(map: &Map<String, Value>, name: &str, key: &str) -> Result<Option<i64>, CommandError> {
    map.get(key)
        .map(|value| {
            value
                .as_i64()
                .ok_or_else(|| CommandError::invalid(name, "expected an integer"))
        })
        .transpose()
}

fn alignment(map: &Map<String, Value>, name: &str) -> Result<Option<u32>, CommandError> {
    map.get("alignment")
        .map(|value| {
            value
                .as_u64()
                .and_then(|raw| u32::try_from(raw).ok())
                .ok_or_else(|| CommandError::invalid(name, "expected alignment flags"))
        })
        .transpose()
}

pub(super) fn reset_scene_item(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene-name", studio)?;
        studio.reset_scene_item(&scene, &item)?;
        done()
    })
}

pub(super) fn delete_scene_item(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene", studio)?;
        studio.delete_scene_item(&scene, &item)?;
        done()
    })
}

pub(super) fn add_scene_item(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let scene = params.str("sceneName")?;
    let source = params.str("sourceName")?;
    let visible = params.opt_bool("setVisible")?.unwrap_or(true);
    let id = context
        .studio
        .with_studio(|studio| studio.add_scene_item(scene, source, visible))?;
    Ok(fields(json!({ "itemId": id })))
}

pub(super) fn duplicate_scene_item(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let item = params.item("item")?;
    context.studio.with_studio(|studio| {
        let from = params.scene_or_current("fromScene", studio)?;
        let to = params.scene_or_current("toScene", studio)?;
        let copy = studio.duplicate_scene_item(&from, &to, &item)?;
        Ok(fields(json!({
            "scene": to,
            "item": { "id": copy.id, "name": copy.source },
        })))
    })
}

pub(super) fn reorder_scene_items(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let order = params
        .array("items")?
        .iter()
        .map(|value| item_ref("items", value))
        .collect::<Result<Vec<_>, _>>()?;
    context.studio.with_studio(|studio| {
        let scene = params.scene_or_current("scene", studio)?;
        studio.reorder_scene_items(&scene, &order)?;
        done()
    })
}
