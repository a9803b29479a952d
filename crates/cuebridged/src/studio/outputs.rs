//! Streaming, recording, replay buffer and generic output state.

use super::errors::{EntityKind, StudioError};
use super::model::{Output, RecordingState};
use super::state::Studio;

impl Studio {
    /// Starts streaming.
    ///
    /// # Errors
    ///
    /// Fails when already streaming.
    pub fn start_streaming(&mut self) -> Result<(), StudioError> {
        if self.streaming {
            return Err(StudioError::Conflict("streaming already active"));
        }
        self.streaming = true;
        Ok(())
    }

    /// Stops streaming and discards captions sent during the session.
    ///
    /// # Errors
    ///
    /// Fails when not streaming.
    pub fn stop_streaming(&mut self) -> Result<(), StudioError> {
        if !self.streaming {
            return Err(StudioError::Conflict("streaming not active"));
        }
        self.streaming = false;
        self.captions.clear();
        Ok(())
    }

    /// Flips streaming, returning the new state.
    pub fn toggle_streaming(&mut self) -> bool {
        if self.streaming {
            self.streaming = false;
            self.captions.clear();
        } else {
            self.streaming = true;
        }
        self.streaming
    }

    /// Records a caption line on the live stream.
    ///
    /// # Errors
    ///
    /// Fails when not streaming.
    pub fn send_caption(&mut self, text: &str) -> Result<(), StudioError> {
        if !self.streaming {
            return Err(StudioError::Conflict("streaming not active"));
        }
        self.captions.push(text.to_owned());
        Ok(())
    }

    /// Persists the current stream settings.
    pub fn save_stream_settings(&mut self) {
        self.saved_stream_settings = self.stream_settings.clone();
    }

    /// Starts recording into the recording folder.
    ///
    /// # Errors
    ///
    /// Fails when already recording.
    pub fn start_recording(&mut self) -> Result<(), StudioError> {
        if self.recording.active {
            return Err(StudioError::Conflict("recording already active"));
        }
        self.begin_recording();
        Ok(())
    }

    fn begin_recording(&mut self) {
        self.recording = RecordingState {
            active: true,
            paused: false,
            filename: Some(format!(
                "{}/{}.mkv",
                self.recording_folder.trim_end_matches('/'),
                self.filename_formatting
            )),
        };
    }

    /// Stops recording.
    ///
    /// # Errors
    ///
    /// Fails when not recording.
    pub fn stop_recording(&mut self) -> Result<(), StudioError> {
        if !self.recording.active {
            return Err(StudioError::Conflict("recording not active"));
        }
        self.recording = RecordingState::default();
        Ok(())
    }

    /// Flips recording, returning the new state.
    pub fn toggle_recording(&mut self) -> bool {
        if self.recording.active {
            self.recording = RecordingState::default();
        } else {
            self.begin_recording();
        }
        self.recording.active
    }

    /// Pauses an active recording.
    ///
    /// # Errors
    ///
    /// Fails when not recording or already paused.
    pub fn pause_recording(&mut self) -> Result<(), StudioError> {
        if !self.recording.active {
            return Err(StudioError::Conflict("recording not active"));
        }
        if self.recording.paused {
            return Err(StudioError::Conflict("recording already paused"));
        }
        self.recording.paused = true;
        Ok(())
    }

    /// Resumes a paused recording.
    ///
    /// # Errors
    ///
    /// Fails when not recording or not paused.
    pub fn resume_recording(&mut self) -> Result<(), StudioError> {
        if !self.recording.active {
            return Err(StudioError::Conflict("recording not active"));
        }
        if !self.recording.paused {
            return Err(StudioError::Conflict("recording not paused"));
        }
        self.recording.paused = false;
        Ok(())
    }

    /// Changes the folder used by the next recording.
    ///
    /// # Errors
    ///
    /// Fails when the folder is blank.
    pub fn set_recording_folder(&mut self, folder: &str) -> Result<(), StudioError> {
        if folder.trim().is_empty() {
            return Err(StudioError::InvalidValue(String::from(
                "recording folder must not be empty",
            )));
        }
        folder.clone_into(&mut self.recording_folder);
        Ok(())
    }

    /// Starts the replay buffer.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is already running.
    pub fn start_replay_buffer(&mut self) -> Result<(), StudioError> {
        if self.replay_buffer {
            return Err(StudioError::Conflict("replay buffer already active"));
        }
        self.replay_buffer = true;
        Ok(())
    }

    /// Stops the replay buffer.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is not running.
    pub fn stop_replay_buffer(&mut self) -> Result<(), StudioError> {
        if !self.replay_buffer {
            return Err(StudioError::Conflict("replay buffer not active"));
        }
        self.replay_buffer = false;
        Ok(())
    }

    /// Flips the replay buffer, returning the new state.
    pub fn toggle_replay_buffer(&mut self) -> bool {
        self.replay_buffer = !self.replay_buffer;
        self.replay_buffer
    }

    /// Saves the buffered replay.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is not running.
    pub fn save_replay_buffer(&mut self) -> Result<(), StudioError> {
        if !self.replay_buffer {
            return Err(StudioError::Conflict("replay buffer not active"));
        }
        self.replay_saves += 1;
        Ok(())
    }

    /// Looks up a generic output.
    ///
    /// # Errors
    ///
    /// Fails when the output is missing.
    pub fn output(&self, name: &str) -> Result<&Output, StudioError> {
        self.outputs
            .iter()
            .find(|output| output.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Output, name))
    }

    /// Starts a generic output.
    ///
    /// # Errors
    ///
    /// Fails when the output is missing or already running.
    pub fn start_output(&mut self, name: &str) -> Result<(), StudioError> {
        let output = self.output_mut(name)?;
        if output.active {
            return Err(StudioError::Conflict("output already active"));
        }
        output.active = true;
        Ok(())
    }

    /// Stops a generic output.
    ///
    /// # Errors
    ///
    /// Fails when the output is missing or not running.
    pub fn stop_output(&mut self, name: &str) -> Result<(), StudioError> {
        let output = self.output_mut(name)?;
        if !output.active {
            return Err(StudioError::Conflict("output not active"));
        }
        output.active = false;
        Ok(())
    }

    fn output_mut(&mut self, name: &str) -> Result<&mut Output, StudioError> {
        self.outputs
            .iter_mut()
            .find(|output| output.name == name)
            .ok_or_else(|| StudioError::not_found(EntityKind::Output, name))
    }
}
