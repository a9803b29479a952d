//! Scene, scene item, transition and studio-mode operations.

use super::errors::{EntityKind, StudioError};
use super::model::{ItemRef, Scene, SceneItem, Transform, Transition, TransitionOverride};
use super::state::Studio;

impl Studio {
    /// Looks up a scene.
    ///
    /// # Errors
    ///
    /// Fails when the scene is missing.
    pub fn scene(&self, name: &str) -> Result<&Scene, StudioError> {
        self.scenes
            .iter()
            .find(|scene| scene.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Scene, name))
    }

    /// Looks up a scene for mutation.
    ///
    /// # Errors
    ///
    /// Fails when the scene is missing.
    pub fn scene_mut(&mut self, name: &str) -> Result<&mut Scene, StudioError> {
        self.scenes
            .iter_mut()
            .find(|scene| scene.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Scene, name))
    }

    /// Resolves an optional scene name, defaulting to the program scene.
    pub fn scene_name_or_current(&self, name: Option<&str>) -> String {
        name.map_or_else(|| self.current_scene.clone(), str::to_owned)
    }

    /// The program scene.
    ///
    /// # Errors
    ///
    /// Fails only if the program scene was removed underneath us.
    pub fn current_scene(&self) -> Result<&Scene, StudioError> {
        self.scene(&self.current_scene)
    }

    /// Switches the program scene.
    ///
    /// # Errors
    ///
    /// Fails when the scene is missing.
    pub fn set_current_scene(&mut self, name: &str) -> Result<(), StudioError> {
        self.scene(name)?;
        name.clone_into(&mut self.current_scene);
        Ok(())
    }

    /// Adds an empty scene.
    ///
    /// # Errors
    ///
    /// Fails when a scene or source already uses the name.
    pub fn create_scene(&mut self, name: &str) -> Result<(), StudioError> {
        if name.trim().is_empty() {
            return Err(StudioError::InvalidValue(String::from(
                "scene name must not be empty",
            )));
        }
        if self.name_in_use(name) {
            return Err(StudioError::already_exists(EntityKind::Scene, name));
        }
        self.scenes.push(Scene::new(name));
        Ok(())
    }

    /// Forces `transition` whenever `scene` is switched to.
    ///
    /// # Errors
    ///
    /// Fails when the scene or transition is missing.
    pub fn set_transition_override(
        &mut self,
        scene: &str,
        transition: &str,
        duration_ms: Option<u64>,
    ) -> Result<(), StudioError> {
        self.transition(transition)?;
        self.scene_mut(scene)?.transition_override = Some(TransitionOverride {
            transition: transition.to_owned(),
            duration_ms,
        });
        Ok(())
    }

    /// Clears a scene's transition override.
    ///
    /// # Errors
    ///
    /// Fails when the scene is missing or has no override.
    pub fn remove_transition_override(&mut self, scene: &str) -> Result<(), StudioError> {
        match self.scene_mut(scene)?.transition_override.take() {
            Some(_) => Ok(()),
            None => Err(StudioError::Conflict("scene has no transition override")),
        }
    }

    /// Finds an item in a scene.
    ///
    /// # Errors
    ///
    /// Fails when the scene or item is missing.
    pub fn item(&self, scene: &str, item: &ItemRef) -> Result<&SceneItem, StudioError> {
        self.scene(scene)?
            .items
            .iter()
            .find(|candidate| matches_item(candidate, item))
            .ok_or_else(|| StudioError::not_found(EntityKind::SceneItem, item.to_string()))
    }

    /// Finds an item in a scene for mutation.
    ///
    /// # Errors
    ///
    /// Fails when the scene or item is missing.
    pub fn item_mut(&mut self, scene: &str, item: &ItemRef) -> Result<&mut SceneItem, StudioError> {
        self.scene_mut(scene)?
            .items
            .iter_mut()
            .find(|candidate| matches_item(candidate, item))
            .ok_or_else(|| StudioError::not_found(EntityKind::SceneItem, item.to_string()))
    }

    /// Places an existing source or scene at the top of `scene`.
    ///
    /// # Errors
    ///
    /// Fails when either name is missing or a scene would contain itself.
    pub fn add_scene_item(
        &mut self,
        scene: &str,
        source: &str,
        visible: bool,
    ) -> Result<i64, StudioError> {
        if scene == source {
            return Err(StudioError::InvalidValue(String::from(
                "a scene cannot contain itself",
            )));
        }
        self.scene(scene)?;
        if !self.name_in_use(source) {
            return Err(StudioError::not_found(EntityKind::Source, source));
        }
        self.place(scene, source, visible)
    }

    /// Removes an item from a scene.
    ///
    /// # Errors
    ///
    /// Fails when the scene or item is missing.
    pub fn delete_scene_item(&mut self, scene: &str, item: &ItemRef) -> Result<SceneItem, StudioError> {
        let scene = self.scene_mut(scene)?;
        let index = scene
            .items
            .iter()
            .position(|candidate| matches_item(candidate, item))
            .ok_or_else(|| StudioError::not_found(EntityKind::SceneItem, item.to_string()))?;
        Ok(scene.items.remove(index))
    }

    /// Copies an item, with its transform, to the top of `to_scene`.
    ///
    /// # Errors
    ///
    /// Fails when either scene or the item is missing.
    pub fn duplicate_scene_item(
        &mut self,
        from_scene: &str,
        to_scene: &str,
        item: &ItemRef,
    ) -> Result<SceneItem, StudioError> {
        let mut copy = self.item(from_scene, item)?.clone();
        if copy.source == to_scene {
            return Err(StudioError::InvalidValue(String::from(
                "a scene cannot contain itself",
            )));
        }
        self.scene(to_scene)?;
        copy.id = self.allocate_item_id();
        self.scene_mut(to_scene)?.items.push(copy.clone());
        Ok(copy)
    }

    /// Puts the listed items first, in the given order; the rest keep
    /// their relative order after them.
    ///
    /// # Errors
    ///
    /// Fails when an item is missing or listed twice.
    pub fn reorder_scene_items(&mut self, scene: &str, order: &[ItemRef]) -> Result<(), StudioError> {
        let scene = self.scene_mut(scene)?;
        let mut remaining = scene.items.clone();
        let mut reordered = Vec::with_capacity(remaining.len());
        for wanted in order {
            let Some(index) = remaining
                .iter()
                .position(|candidate| matches_item(candidate, wanted))
            else {
                let listed_twice = reordered
                    .iter()
                    .any(|candidate| matches_item(candidate, wanted));
                return Err(if listed_twice {
                    StudioError::InvalidValue(format!("scene item {wanted} is listed twice"))
                } else {
                    StudioError::not_found(EntityKind::SceneItem, wanted.to_string())
                });
            };
            reordered.push(remaining.remove(index));
        }
        reordered.append(&mut remaining);
        scene.items = reordered;
        Ok(())
    }

    /// Restores an item's default transform.
    ///
    /// # Errors
    ///
    /// Fails when the scene or item is missing.
    pub fn reset_scene_item(&mut self, scene: &str, item: &ItemRef) -> Result<(), StudioError> {
        self.item_mut(scene, item)?.transform = Transform::default();
        Ok(())
    }

    /// Looks up a transition.
    ///
    /// # Errors
    ///
    /// Fails when the transition is missing.
    pub fn transition(&self, name: &str) -> Result<&Transition, StudioError> {
        self.transitions
            .iter()
            .find(|transition| transition.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Transition, name))
    }

    /// Selects the active transition.
    ///
    /// # Errors
    ///
    /// Fails when the transition is missing.
    pub fn set_current_transition(&mut self, name: &str) -> Result<(), StudioError> {
        self.transition(name)?;
        name.clone_into(&mut self.current_transition);
        Ok(())
    }

    /// Enables or disables studio mode. Enabling previews the program
    /// scene; disabling drops the preview.
    pub fn set_studio_mode(&mut self, enabled: bool) {
        self.studio_mode = enabled;
        if enabled {
            if self.preview_scene.is_none() {
                self.preview_scene = Some(self.current_scene.clone());
            }
        } else {
            self.preview_scene = None;
        }
    }

    /// The preview scene.
    ///
    /// # Errors
    ///
    /// Fails when studio mode is off.
    pub fn preview_scene(&self) -> Result<&Scene, StudioError> {
        if !self.studio_mode {
            return Err(StudioError::StudioModeDisabled);
        }
        let name = self.preview_scene.as_deref().unwrap_or(&self.current_scene);
        self.scene(name)
    }

    /// Selects the preview scene.
    ///
    /// # Errors
    ///
    /// Fails when studio mode is off or the scene is missing.
    pub fn set_preview_scene(&mut self, name: &str) -> Result<(), StudioError> {
        if !self.studio_mode {
            return Err(StudioError::StudioModeDisabled);
        }
        self.scene(name)?;
        self.preview_scene = Some(name.to_owned());
        Ok(())
    }

    /// Moves the preview scene to program, optionally through a specific
    /// transition which then becomes current.
    ///
    /// # Errors
    ///
    /// Fails when studio mode is off or the transition is missing.
    pub fn transition_to_program(
        &mut self,
        transition: Option<(&str, Option<u64>)>,
    ) -> Result<(), StudioError> {
        if !self.studio_mode {
            return Err(StudioError::StudioModeDisabled);
        }
        if let Some((name, duration_ms)) = transition {
            self.set_current_transition(name)?;
            if let Some(duration_ms) = duration_ms {
                self.transition_duration_ms = duration_ms;
            }
        }
        let preview = self.preview_scene()?.name.clone();
        self.current_scene = preview;
        Ok(())
    }
}

fn matches_item(candidate: &SceneItem, wanted: &ItemRef) -> bool {
    match wanted {
        ItemRef::Id(id) => candidate.id == *id,
        ItemRef::Name(name) => candidate.source == *name,
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn studio() -> Studio {
        Studio::default()
    }

    fn names(studio: &Studio, scene: &str) -> Vec<String> {
        studio
            .scene(scene)
            .expect("scene")
            .items
            .iter()
            .map(|item| item.source.clone())
            .collect()
    }

    #[rstest]
    fn switching_to_a_missing_scene_leaves_program_alone(mut studio: Studio) {
        let error = studio.set_current_scene("Nope").expect_err("missing scene");
        assert_eq!(error, StudioError::not_found(EntityKind::Scene, "Nope"));
        assert_eq!(studio.current_scene, "Live");
    }

    #[rstest]
    fn scene_names_cannot_collide_with_sources(mut studio: Studio) {
        assert!(matches!(
            studio.create_scene("Camera"),
            Err(StudioError::AlreadyExists { .. })
        ));
        studio.create_scene("Interview").expect("create");
        assert!(studio.scene("Interview").is_ok());
    }

    #[rstest]
    fn items_resolve_by_id_or_source_name(studio: Studio) {
        let by_name = studio
            .item("Live", &ItemRef::Name(String::from("Chat")))
            .expect("by name");
        let by_id = studio.item("Live", &ItemRef::Id(by_name.id)).expect("by id");
        assert_eq!(by_name, by_id);
    }

    #[rstest]
    fn scenes_cannot_nest_themselves(mut studio: Studio) {
        assert!(matches!(
            studio.add_scene_item("Live", "Live", true),
            Err(StudioError::InvalidValue(_))
        ));
        let id = studio
            .add_scene_item("Live", "Be Right Back", true)
            .expect("nest other scene");
        assert!(studio.item("Live", &ItemRef::Id(id)).is_ok());
    }

    #[rstest]
    fn duplicates_get_fresh_ids(mut studio: Studio) {
        let original = studio
            .item("Live", &ItemRef::Name(String::from("Camera")))
            .expect("camera")
            .clone();
        let copy = studio
            .duplicate_scene_item("Live", "Be Right Back", &ItemRef::Id(original.id))
            .expect("duplicate");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.source, "Camera");
        assert_eq!(names(&studio, "Be Right Back").last().map(String::as_str), Some("Camera"));
    }

    #[rstest]
    fn reorder_moves_listed_items_first(mut studio: Studio) {
        studio
            .reorder_scene_items("Live", &[ItemRef::Name(String::from("Chat"))])
            .expect("reorder");
        assert_eq!(names(&studio, "Live"), vec!["Chat", "Camera", "Headline"]);
    }

    #[rstest]
    #[case::listed_twice(&["Chat", "Chat"])]
    #[case::missing_item(&["Headline", "Missing"])]
    fn failed_reorder_leaves_order_untouched(mut studio: Studio, #[case] order: &[&str]) {
        let before = names(&studio, "Live");
        let order: Vec<_> = order
            .iter()
            .map(|name| ItemRef::Name((*name).to_owned()))
            .collect();
        studio
            .reorder_scene_items("Live", &order)
            .expect_err("reorder should fail");
        assert_eq!(names(&studio, "Live"), before);
    }

    #[rstest]
    fn preview_requires_studio_mode(mut studio: Studio) {
        assert_eq!(
            studio.set_preview_scene("Be Right Back"),
            Err(StudioError::StudioModeDisabled)
        );
        studio.set_studio_mode(true);
        studio.set_preview_scene("Be Right Back").expect("preview");
        studio.transition_to_program(None).expect("transition");
        assert_eq!(studio.current_scene, "Be Right Back");
        studio.set_studio_mode(false);
        assert!(studio.preview_scene.is_none());
    }

    #[rstest]
    fn overrides_need_an_existing_transition(mut studio: Studio) {
        assert!(studio.set_transition_override("Live", "Swipe", None).is_err());
        studio
            .set_transition_override("Live", "Cut", Some(100))
            .expect("override");
        studio.remove_transition_override("Live").expect("remove");
        assert_eq!(
            studio.remove_transition_override("Live"),
            Err(StudioError::Conflict("scene has no transition override"))
        );
    }
}
