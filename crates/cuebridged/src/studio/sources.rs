//! Source, filter and media operations.

use super::errors::{EntityKind, StudioError};
use super::model::{Filter, FilterMovement, MediaPlayback, MediaState, Settings, Source};
use super::state::Studio;

/// Source type ids accepted by the GDI+ text commands.
pub const TEXT_GDIPLUS_TYPES: &[&str] = &["text_gdiplus", "text_gdiplus_v2"];
/// Source type ids accepted by the FreeType 2 text commands.
pub const TEXT_FREETYPE2_TYPES: &[&str] = &["text_ft2_source", "text_ft2_source_v2"];
/// Source type ids accepted by the browser source commands.
pub const BROWSER_TYPES: &[&str] = &["browser_source"];

impl Studio {
    /// Looks up an input source.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing.
    pub fn source(&self, name: &str) -> Result<&Source, StudioError> {
        self.sources
            .iter()
            .find(|source| source.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Source, name))
    }

    /// Looks up an input source for mutation.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing.
    pub fn source_mut(&mut self, name: &str) -> Result<&mut Source, StudioError> {
        self.sources
            .iter_mut()
            .find(|source| source.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Source, name))
    }

    /// Looks up a source whose type id is one of `types`.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or of another kind.
    pub fn typed_source_mut(
        &mut self,
        name: &str,
        types: &[&str],
        expected: &'static str,
    ) -> Result<&mut Source, StudioError> {
        let source = self.source_mut(name)?;
        if !types.contains(&source.type_id.as_str()) {
            return Err(StudioError::wrong_kind(name, expected));
        }
        Ok(source)
    }

    /// Renames a source, following it through every scene and channel.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or the new name is taken.
    pub fn rename_source(&mut self, name: &str, new_name: &str) -> Result<(), StudioError> {
        self.source(name)?;
        if new_name.trim().is_empty() {
            return Err(StudioError::InvalidValue(String::from(
                "source name must not be empty",
            )));
        }
        if self.name_in_use(new_name) {
            return Err(StudioError::already_exists(EntityKind::Source, new_name));
        }
        self.source_mut(name)?.name = new_name.to_owned();
        for item in self
            .scenes
            .iter_mut()
            .flat_map(|scene| scene.items.iter_mut())
            .filter(|item| item.source == name)
        {
            new_name.clone_into(&mut item.source);
        }
        for (_, channel) in self
            .special_sources
            .iter_mut()
            .filter(|(_, channel)| channel == name)
        {
            new_name.clone_into(channel);
        }
        Ok(())
    }

    /// Merges `settings` into the source's settings and returns the result.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing.
    pub fn merge_source_settings(
        &mut self,
        name: &str,
        settings: &Settings,
    ) -> Result<&Settings, StudioError> {
        let source = self.source_mut(name)?;
        merge(&mut source.settings, settings);
        Ok(&source.settings)
    }

    /// Looks up a filter on a source.
    ///
    /// # Errors
    ///
    /// Fails when the source or filter is missing.
    pub fn filter(&self, source: &str, filter: &str) -> Result<&Filter, StudioError> {
        self.source(source)?
            .filters
            .iter()
            .find(|candidate| candidate.name == filter)
            .ok_or_else(|| StudioError::not_found(EntityKind::Filter, filter))
    }

    /// Looks up a filter on a source for mutation.
    ///
    /// # Errors
    ///
    /// Fails when the source or filter is missing.
    pub fn filter_mut(&mut self, source: &str, filter: &str) -> Result<&mut Filter, StudioError> {
        self.source_mut(source)?
            .filters
            .iter_mut()
            .find(|candidate| candidate.name == filter)
            .ok_or_else(|| StudioError::not_found(EntityKind::Filter, filter))
    }

    /// Appends an enabled filter to a source.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or the filter name is taken.
    pub fn add_filter(
        &mut self,
        source: &str,
        name: &str,
        type_id: &str,
        settings: Settings,
    ) -> Result<(), StudioError> {
        let filters = &mut self.source_mut(source)?.filters;
        if filters.iter().any(|filter| filter.name == name) {
            return Err(StudioError::already_exists(EntityKind::Filter, name));
        }
        filters.push(Filter {
            name: name.to_owned(),
            type_id: type_id.to_owned(),
            enabled: true,
            settings,
        });
        Ok(())
    }

    /// Detaches a filter.
    ///
    /// # Errors
    ///
    /// Fails when the source or filter is missing.
    pub fn remove_filter(&mut self, source: &str, name: &str) -> Result<Filter, StudioError> {
        let filters = &mut self.source_mut(source)?.filters;
        let index = filter_index(filters, name)?;
        Ok(filters.remove(index))
    }

    /// Moves a filter to `index` in the chain.
    ///
    /// # Errors
    ///
    /// Fails when the filter is missing or `index` is out of range.
    pub fn reorder_filter(&mut self, source: &str, name: &str, index: usize) -> Result<(), StudioError> {
        let filters = &mut self.source_mut(source)?.filters;
        let current = filter_index(filters, name)?;
        if index >= filters.len() {
            return Err(StudioError::InvalidValue(format!(
                "filter index {index} is out of range"
            )));
        }
        let filter = filters.remove(current);
        filters.insert(index, filter);
        Ok(())
    }

    /// Moves a filter one step or to either end of the chain.
    ///
    /// # Errors
    ///
    /// Fails when the source or filter is missing.
    pub fn move_filter(
        &mut self,
        source: &str,
        name: &str,
        movement: FilterMovement,
    ) -> Result<(), StudioError> {
        let filters = &mut self.source_mut(source)?.filters;
        let current = filter_index(filters, name)?;
        let last = filters.len().saturating_sub(1);
        let target = match movement {
            FilterMovement::Up => current.saturating_sub(1),
            FilterMovement::Down => (current + 1).min(last),
            FilterMovement::Top => 0,
            FilterMovement::Bottom => last,
        };
        let filter = filters.remove(current);
        filters.insert(target, filter);
        Ok(())
    }

    /// Playback state of a media source.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or not a media source.
    pub fn media(&self, source: &str) -> Result<&MediaPlayback, StudioError> {
        self.source(source)?
            .media
            .as_ref()
            .ok_or_else(|| StudioError::wrong_kind(source, "media"))
    }

    /// Playback state of a media source, for mutation.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or not a media source.
    pub fn media_mut(&mut self, source: &str) -> Result<&mut MediaPlayback, StudioError> {
        self.source_mut(source)?
            .media
            .as_mut()
            .ok_or_else(|| StudioError::wrong_kind(source, "media"))
    }
}

impl MediaPlayback {
    /// Plays, or pauses when `pause` is set.
    pub fn play_pause(&mut self, pause: bool) {
        self.state = if pause {
            MediaState::Paused
        } else {
            if matches!(self.state, MediaState::Ended | MediaState::Stopped) {
                self.time_ms = 0;
            }
            MediaState::Playing
        };
    }

    /// Rewinds and plays.
    pub fn restart(&mut self) {
        self.time_ms = 0;
        self.state = MediaState::Playing;
    }

    /// Stops and rewinds.
    pub fn stop(&mut self) {
        self.time_ms = 0;
        self.state = MediaState::Stopped;
    }

    /// Advances to the next playlist entry, if any.
    pub fn next(&mut self) {
        if self.playlist_index + 1 < self.playlist_len {
            self.playlist_index += 1;
            self.time_ms = 0;
        }
    }

    /// Returns to the previous playlist entry, if any.
    pub fn previous(&mut self) {
        if self.playlist_index > 0 {
            self.playlist_index -= 1;
            self.time_ms = 0;
        }
    }
}

fn filter_index(filters: &[Filter], name: &str) -> Result<usize, StudioError> {
    filters
        .iter()
        .position(|filter| filter.name == name)
        .ok_or_else(|| StudioError::not_found(EntityKind::Filter, name))
}

/// Shallow merge: keys in `update` replace keys in `target`.
pub fn merge(target: &mut Settings, update: &Settings) {
    for (key, value) in update {
        target.insert(key.clone(), value.clone());
    }
}
