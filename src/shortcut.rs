use winit::keyboard::{Key, ModifiersState};

const START_KEY: &str = "Enter";

// ---------------------------------------------------------------------------
// Host platform
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostPlatform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl HostPlatform {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            HostPlatform::MacOs
        } else if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else if cfg!(target_os = "linux") {
            HostPlatform::Linux
        } else {
            HostPlatform::Other
        }
    }

    pub fn primary_modifier(self) -> PrimaryModifier {
        match self {
            HostPlatform::MacOs => PrimaryModifier::Command,
            _ => PrimaryModifier::Control,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryModifier {
    /// The logo key: Cmd on macOS.
    Command,
    Control,
}

// ---------------------------------------------------------------------------
// Key chords
// ---------------------------------------------------------------------------

/// A pressed key together with the modifiers held at the time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
    /// Named keys use their debug name ("Enter", "F5"), characters are uppercased.
    pub key: String,
}

impl KeyChord {
    pub fn from_winit(key: &Key, modifiers: ModifiersState) -> Option<Self> {
        let key = match key {
            Key::Character(text) => text.to_uppercase(),
            Key::Named(named) => format!("{:?}", named),
            _ => return None,
        };
        Some(Self {
            ctrl: modifiers.control_key(),
            alt: modifiers.alt_key(),
            shift: modifiers.shift_key(),
            logo: modifiers.super_key(),
            key,
        })
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.logo {
            parts.push("Cmd");
        }
        parts.push(self.key.as_str());
        parts.join("+")
    }

    fn holds(&self, modifier: PrimaryModifier) -> bool {
        match modifier {
            PrimaryModifier::Command => self.logo,
            PrimaryModifier::Control => self.ctrl,
        }
    }
}

/// Primary modifier + Enter. Other modifiers do not matter.
pub fn is_start_shortcut(platform: HostPlatform, chord: &KeyChord) -> bool {
    chord.key == START_KEY && chord.holds(platform.primary_modifier())
}

pub fn shortcut_label(platform: HostPlatform) -> &'static str {
    match platform.primary_modifier() {
        PrimaryModifier::Command => "⌘↵",
        PrimaryModifier::Control => "Ctrl↵",
    }
}
