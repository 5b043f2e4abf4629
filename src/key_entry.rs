use std::time::{Duration, Instant};

use crate::flash::ErrorFlash;
use crate::session::{HelpOpener, SessionStarter};
use crate::shortcut::{self, HostPlatform, KeyChord};
use crate::store::KeyValueStore;

pub const API_KEY_STORE_KEY: &str = "apiKey";

#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartAttempt {
    Started,
    EmptyCredential,
}

/// State behind the API key screen: the credential draft, the error flash,
/// and the capabilities it hands work to.
pub struct KeyEntry<S, C, H> {
    draft: String,
    flash: ErrorFlash,
    input_focused: bool,
    platform: HostPlatform,
    store: S,
    starter: C,
    help: H,
}

impl<S, C, H> KeyEntry<S, C, H>
where
    S: KeyValueStore,
    C: SessionStarter,
    H: HelpOpener,
{
    /// Builds the view with the persisted draft, or an empty one when nothing
    /// has been stored yet.
    pub fn load(store: S, starter: C, help: H, platform: HostPlatform) -> Self {
        let draft = match store.get(API_KEY_STORE_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read saved API key");
                String::new()
            }
        };
        tracing::debug!(has_saved_key = !draft.is_empty(), ?platform, "key entry loaded");

        Self {
            draft,
            flash: ErrorFlash::default(),
            input_focused: false,
            platform,
            store,
            starter,
            help,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn error_active(&self) -> bool {
        self.flash.is_active()
    }

    pub fn shortcut_label(&self) -> &'static str {
        shortcut::shortcut_label(self.platform)
    }

    #[cfg(test)]
    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn starter(&self) -> &C {
        &self.starter
    }

    #[cfg(test)]
    pub fn help(&self) -> &H {
        &self.help
    }

    /// Replaces the draft and writes it through to the store unchanged.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        if let Err(err) = self.store.set(API_KEY_STORE_KEY, &self.draft) {
            tracing::warn!(error = %err, "failed to persist API key");
        }
        if self.flash.is_active() {
            self.flash.clear();
        }
    }

    pub fn attempt_start(&mut self, now: Instant) -> StartAttempt {
        let trimmed = self.draft.trim();
        if trimmed.is_empty() {
            tracing::debug!("start attempted with empty API key");
            self.flash.trigger(now);
            return StartAttempt::EmptyCredential;
        }
        self.starter.start(trimmed);
        StartAttempt::Started
    }

    /// Runs the start accelerator. Returns true when the key was consumed and
    /// must not reach the text field.
    pub fn handle_key(&mut self, chord: &KeyChord, now: Instant) -> bool {
        if !self.input_focused || !shortcut::is_start_shortcut(self.platform, chord) {
            return false;
        }
        let outcome = self.attempt_start(now);
        tracing::debug!(chord = %chord.display(), ?outcome, "start shortcut pressed");
        true
    }

    pub fn open_help(&mut self) {
        self.help.open_help();
    }

    pub fn set_input_focused(&mut self, focused: bool) {
        self.input_focused = focused;
    }

    pub fn tick(&mut self, now: Instant) {
        if self.flash.expire(now) {
            tracing::trace!("error flash cleared");
        }
    }

    /// Time until the error flash turns itself off, if it is showing.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.flash.remaining(now)
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{BrokenStore, CountingStore, RecordingHelp, RecordingStarter};
    use super::*;
    use crate::flash::FLASH_DURATION;
    use pretty_assertions::assert_eq;
    use winit::keyboard::{Key, ModifiersState, NamedKey};

    type TestEntry = KeyEntry<CountingStore, RecordingStarter, RecordingHelp>;

    fn entry_with(store: CountingStore, platform: HostPlatform) -> TestEntry {
        KeyEntry::load(
            store,
            RecordingStarter::default(),
            RecordingHelp::default(),
            platform,
        )
    }

    fn stored(entry: &TestEntry) -> Option<String> {
        entry.store().get(API_KEY_STORE_KEY).unwrap()
    }

    fn enter_with(modifiers: ModifiersState) -> KeyChord {
        KeyChord::from_winit(&Key::Named(NamedKey::Enter), modifiers).unwrap()
    }

    #[test]
    fn initial_value_comes_from_store() {
        let entry = entry_with(
            CountingStore::with_entry(API_KEY_STORE_KEY, "K1"),
            HostPlatform::Linux,
        );
        assert_eq!(entry.draft(), "K1");

        let empty = entry_with(CountingStore::default(), HostPlatform::Linux);
        assert_eq!(empty.draft(), "");
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let entry = KeyEntry::load(
            BrokenStore,
            RecordingStarter::default(),
            RecordingHelp::default(),
            HostPlatform::Linux,
        );
        assert_eq!(entry.draft(), "");
    }

    #[test]
    fn failed_write_still_updates_draft() {
        let mut entry = KeyEntry::load(
            BrokenStore,
            RecordingStarter::default(),
            RecordingHelp::default(),
            HostPlatform::Linux,
        );
        entry.update_draft("sk-test");
        assert_eq!(entry.draft(), "sk-test");
    }

    #[test]
    fn every_update_is_written_through_untrimmed() {
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Linux);
        for text in ["s", "sk", "  sk-test  ", "", "\t\n", "ключ-🔑"] {
            entry.update_draft(text);
            assert_eq!(entry.draft(), text);
            assert_eq!(stored(&entry).as_deref(), Some(text));
        }
        assert_eq!(entry.store().writes, 6);
    }

    #[test]
    fn empty_or_blank_draft_flashes_without_starting() {
        let now = Instant::now();
        for draft in [None, Some(""), Some("   ")] {
            let store = match draft {
                Some(value) => CountingStore::with_entry(API_KEY_STORE_KEY, value),
                None => CountingStore::default(),
            };
            let mut entry = entry_with(store, HostPlatform::Linux);

            assert_eq!(entry.attempt_start(now), StartAttempt::EmptyCredential);
            assert!(entry.error_active());
            assert!(entry.starter().calls.is_empty());
        }
    }

    #[test]
    fn start_receives_trimmed_credential_once() {
        let mut entry = entry_with(
            CountingStore::with_entry(API_KEY_STORE_KEY, "  abc123  "),
            HostPlatform::Linux,
        );
        assert_eq!(entry.attempt_start(Instant::now()), StartAttempt::Started);
        assert_eq!(entry.starter().calls, vec!["abc123".to_string()]);
        assert!(!entry.error_active());
    }

    #[test]
    fn start_never_writes_to_store() {
        let now = Instant::now();
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Linux);
        assert_eq!(entry.attempt_start(now), StartAttempt::EmptyCredential);
        entry.update_draft("sk-test");
        assert_eq!(entry.attempt_start(now), StartAttempt::Started);
        assert_eq!(entry.store().writes, 1);
    }

    #[test]
    fn error_flash_clears_after_delay_without_input() {
        let t0 = Instant::now();
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Linux);
        assert_eq!(entry.attempt_start(t0), StartAttempt::EmptyCredential);

        entry.tick(t0 + Duration::from_millis(500));
        assert!(entry.error_active());
        assert_eq!(
            entry.next_wakeup(t0 + Duration::from_millis(500)),
            Some(Duration::from_millis(500))
        );

        entry.tick(t0 + FLASH_DURATION);
        assert!(!entry.error_active());
        assert_eq!(entry.next_wakeup(t0 + FLASH_DURATION), None);
    }

    #[test]
    fn typing_clears_error_flash_immediately() {
        let t0 = Instant::now();
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Linux);
        assert_eq!(entry.attempt_start(t0), StartAttempt::EmptyCredential);
        assert!(entry.error_active());

        entry.update_draft("s");
        assert!(!entry.error_active());
    }

    #[test]
    fn stale_deadline_does_not_clear_newer_flash() {
        let t0 = Instant::now();
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Linux);
        assert_eq!(entry.attempt_start(t0), StartAttempt::EmptyCredential);
        entry.update_draft("x");
        entry.update_draft("");
        assert_eq!(
            entry.attempt_start(t0 + Duration::from_millis(900)),
            StartAttempt::EmptyCredential
        );

        entry.tick(t0 + FLASH_DURATION);
        assert!(entry.error_active());
        entry.tick(t0 + Duration::from_millis(1900));
        assert!(!entry.error_active());
    }

    #[test]
    fn typed_key_then_shortcut_starts_session() {
        let mut entry = entry_with(CountingStore::default(), HostPlatform::Windows);
        entry.set_input_focused(true);
        entry.update_draft("sk-test");
        assert_eq!(stored(&entry).as_deref(), Some("sk-test"));

        let consumed = entry.handle_key(&enter_with(ModifiersState::CONTROL), Instant::now());
        assert!(consumed);
        assert_eq!(entry.starter().calls, vec!["sk-test".to_string()]);
    }

    #[test]
    fn empty_input_shortcut_flashes_then_recovers() {
        let t0 = Instant::now();
        let mut entry = entry_with(CountingStore::default(), HostPlatform::MacOs);
        entry.set_input_focused(true);

        assert!(entry.handle_key(&enter_with(ModifiersState::SUPER), t0));
        assert!(entry.error_active());

        entry.tick(t0 + FLASH_DURATION);
        assert!(!entry.error_active());
        assert!(entry.starter().calls.is_empty());
    }

    #[test]
    fn shortcut_ignored_without_focus_or_wrong_modifier() {
        let now = Instant::now();
        let mut entry = entry_with(
            CountingStore::with_entry(API_KEY_STORE_KEY, "sk-test"),
            HostPlatform::MacOs,
        );

        assert!(!entry.handle_key(&enter_with(ModifiersState::SUPER), now));

        entry.set_input_focused(true);
        assert!(!entry.handle_key(&enter_with(ModifiersState::CONTROL), now));
        assert!(!entry.handle_key(&enter_with(ModifiersState::empty()), now));
        assert!(entry.starter().calls.is_empty());
    }

    #[test]
    fn help_link_only_calls_collaborator() {
        let mut entry = entry_with(
            CountingStore::with_entry(API_KEY_STORE_KEY, "K1"),
            HostPlatform::Linux,
        );
        entry.open_help();
        assert_eq!(entry.help().opened, 1);
        assert_eq!(entry.draft(), "K1");
        assert_eq!(entry.store().writes, 0);
        assert!(!entry.error_active());
    }
}
