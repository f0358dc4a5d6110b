// Settings record
//
// The flat, owned aggregate of every user-facing frontend setting. Each group
// maps to one section of the configuration file. Every field has a fixed
// default, so a `Settings` value is valid even when no file exists.

use crate::input::{Binding, ControllerType, NUM_JOYPADS, NUM_JOYPAD_LINKS, NUM_SHORTCUTS};
use std::path::PathBuf;
use winit::keyboard::KeyCode;

/// Number of software scaling filters the frontend knows about
pub const SCALE_FILTER_COUNT: u32 = 15;

/// Sprite tiles per line with the hardware limit in place
pub const SPRITE_TILES_LIMITED: u32 = 34;

/// Sprite tiles per line with the limit removed
pub const SPRITE_TILES_UNLIMITED: u32 = 128;

/// Complete frontend settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub display: DisplaySettings,
    pub ntsc: NtscSettings,
    pub gpu: GpuSettings,
    pub sound: SoundSettings,
    pub files: FileSettings,
    pub window: WindowState,
    pub netplay: NetplaySettings,
    pub behavior: BehaviorSettings,
    pub emulation: EmulationSettings,
    pub hacks: HackSettings,
    pub input: InputSettings,
    /// Per-controller button bindings
    pub pads: [[Binding; NUM_JOYPAD_LINKS]; NUM_JOYPADS],
    /// Global emulator shortcut bindings
    pub shortcuts: [Binding; NUM_SHORTCUTS],
}

impl Default for Settings {
    fn default() -> Self {
        let mut pads = [[Binding::None; NUM_JOYPAD_LINKS]; NUM_JOYPADS];
        pads[0] = default_pad_bindings();

        Self {
            display: DisplaySettings::default(),
            ntsc: NtscSettings::default(),
            gpu: GpuSettings::default(),
            sound: SoundSettings::default(),
            files: FileSettings::default(),
            window: WindowState::default(),
            netplay: NetplaySettings::default(),
            behavior: BehaviorSettings::default(),
            emulation: EmulationSettings::default(),
            hacks: HackSettings::default(),
            input: InputSettings::default(),
            pads,
            shortcuts: [Binding::None; NUM_SHORTCUTS],
        }
    }
}

impl Settings {
    /// Reset every field to its default value
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a fullscreen state may be persisted across runs
    ///
    /// Fullscreen is only remembered when the escape key toggles the menu bar;
    /// with any other escape behavior there would be no way back out of it.
    pub fn fullscreen_persists(&self) -> bool {
        self.behavior.esc_behavior == EscBehavior::ToggleMenuBar
    }
}

/// Keyboard layout for the first controller
fn default_pad_bindings() -> [Binding; NUM_JOYPAD_LINKS] {
    let mut pad = [Binding::None; NUM_JOYPAD_LINKS];
    let keys = [
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
        KeyCode::Enter,
        KeyCode::Space,
        KeyCode::KeyX,
        KeyCode::KeyZ,
        KeyCode::KeyS,
        KeyCode::KeyA,
        KeyCode::KeyQ,
        KeyCode::KeyW,
    ];
    for (slot, key) in pad.iter_mut().zip(keys) {
        *slot = Binding::key(key);
    }
    pad
}

/// Aspect ratio correction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// Source proportions, fractional scaling
    Uncorrected,
    /// Source proportions, integer scaling
    UncorrectedInteger,
    /// 4:3, fractional scaling
    FourThree,
    /// 4:3, integer scaling
    FourThreeInteger,
    /// NTSC or PAL pixel aspect, fractional scaling
    Tv,
    /// NTSC or PAL pixel aspect, integer scaling
    TvInteger,
}

impl AspectRatio {
    pub const MAX_INDEX: i64 = 5;

    pub fn from_index(index: i64) -> Self {
        match index.clamp(0, Self::MAX_INDEX) {
            0 => AspectRatio::Uncorrected,
            1 => AspectRatio::UncorrectedInteger,
            2 => AspectRatio::FourThree,
            3 => AspectRatio::FourThreeInteger,
            4 => AspectRatio::Tv,
            _ => AspectRatio::TvInteger,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            AspectRatio::Uncorrected => 0,
            AspectRatio::UncorrectedInteger => 1,
            AspectRatio::FourThree => 2,
            AspectRatio::FourThreeInteger => 3,
            AspectRatio::Tv => 4,
            AspectRatio::TvInteger => 5,
        }
    }

    /// Whether the scale factor is snapped to a whole number
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            AspectRatio::UncorrectedInteger
                | AspectRatio::FourThreeInteger
                | AspectRatio::TvInteger
        )
    }
}

/// Treatment of the console's high-resolution modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiresEffect {
    /// Downscale to low resolution
    Merge,
    /// Leave as-is
    Normal,
    /// Upscale low-resolution screens
    Scale,
}

impl HiresEffect {
    pub fn from_index(index: i64) -> Self {
        match index.clamp(0, 2) {
            0 => HiresEffect::Merge,
            1 => HiresEffect::Normal,
            _ => HiresEffect::Scale,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            HiresEffect::Merge => 0,
            HiresEffect::Normal => 1,
            HiresEffect::Scale => 2,
        }
    }
}

/// What the escape key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscBehavior {
    ToggleMenuBar,
    ExitFullscreen,
    Quit,
}

impl EscBehavior {
    /// Unknown values fall back to the default behavior
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => EscBehavior::ToggleMenuBar,
            2 => EscBehavior::Quit,
            _ => EscBehavior::ExitFullscreen,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            EscBehavior::ToggleMenuBar => 0,
            EscBehavior::ExitFullscreen => 1,
            EscBehavior::Quit => 2,
        }
    }
}

/// Frame pacing method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleMode {
    /// Time frames to 50 or 60 Hz
    Timer,
    /// Same as `Timer`, but skip frames when running slow
    TimerFrameskip,
    /// Synchronize to the sound buffer
    SoundSync,
    /// Unlimited, except potentially by vsync
    None,
}

impl ThrottleMode {
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => ThrottleMode::TimerFrameskip,
            2 => ThrottleMode::SoundSync,
            3 => ThrottleMode::None,
            _ => ThrottleMode::Timer,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            ThrottleMode::Timer => 0,
            ThrottleMode::TimerFrameskip => 1,
            ThrottleMode::SoundSync => 2,
            ThrottleMode::None => 3,
        }
    }

    /// Whether the presenter paces frames with its own timer
    pub fn is_timer_based(self) -> bool {
        matches!(self, ThrottleMode::Timer | ThrottleMode::TimerFrameskip)
    }
}

/// Sound sample interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    None,
    Linear,
    Gaussian,
    Cubic,
    Sinc,
}

impl Interpolation {
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Interpolation::None,
            1 => Interpolation::Linear,
            3 => Interpolation::Cubic,
            4 => Interpolation::Sinc,
            _ => Interpolation::Gaussian,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Interpolation::None => 0,
            Interpolation::Linear => 1,
            Interpolation::Gaussian => 2,
            Interpolation::Cubic => 3,
            Interpolation::Sinc => 4,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Set the screen resolution after opening a ROM
    pub full_screen_on_open: bool,
    /// Set the resolution in fullscreen mode
    pub change_display_resolution: bool,
    /// Platform-specific video mode number
    pub video_mode: i64,
    pub scale_to_fit: bool,
    pub maintain_aspect_ratio: bool,
    pub aspect_ratio: AspectRatio,
    /// Software scaling filter index
    pub scale_method: u32,
    /// 0: 12.5%, 1: 25%, 2: 50%, 3: 100%
    pub scanline_filter_intensity: u8,
    pub overscan: bool,
    pub hires_effect: HiresEffect,
    pub force_inverted_byte_order: bool,
    pub multithreading: bool,
    pub num_threads: u32,
    pub hardware_acceleration: u32,
    /// Smooth the scaled image
    pub bilinear_filter: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            full_screen_on_open: false,
            change_display_resolution: false,
            video_mode: 0,
            scale_to_fit: true,
            maintain_aspect_ratio: true,
            aspect_ratio: AspectRatio::FourThree,
            scale_method: 0,
            scanline_filter_intensity: 0,
            overscan: false,
            hires_effect: HiresEffect::Normal,
            force_inverted_byte_order: false,
            multithreading: false,
            num_threads: 2,
            hardware_acceleration: 0,
            bilinear_filter: false,
        }
    }
}

/// NTSC composite video filter parameters
///
/// Float knobs range over -1.0..=1.0; the defaults are the composite preset.
#[derive(Debug, Clone, PartialEq)]
pub struct NtscSettings {
    pub hue: f64,
    pub saturation: f64,
    pub contrast: f64,
    pub brightness: f64,
    pub sharpness: f64,
    pub artifacts: f64,
    pub gamma: f64,
    pub bleed: f64,
    pub fringing: f64,
    pub resolution: f64,
    pub merge_fields: bool,
    /// 0: 0%, 1: 12.5%, 2: 25%, 3: 50%, 4: 100%
    pub scanline_intensity: u8,
}

impl Default for NtscSettings {
    fn default() -> Self {
        Self {
            hue: 0.0,
            saturation: 0.0,
            contrast: 0.0,
            brightness: 0.0,
            sharpness: 0.0,
            artifacts: 0.0,
            gamma: 0.0,
            bleed: 0.0,
            fringing: 0.0,
            resolution: 0.0,
            merge_fields: true,
            scanline_intensity: 1,
        }
    }
}

/// Hardware-accelerated output settings
#[derive(Debug, Clone, PartialEq)]
pub struct GpuSettings {
    pub sync_to_vblank: bool,
    /// Wait for the GPU to go idle after every presented frame
    pub reduce_input_lag: bool,
    pub use_pbos: bool,
    /// Pixel buffer bit depth, 16 or 32 once validated
    pub pbo_format: u32,
    pub npot_textures: bool,
    pub use_shaders: bool,
    /// Shader preset path, empty when unset
    pub shader_file: String,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            sync_to_vblank: true,
            reduce_input_lag: false,
            use_pbos: true,
            pbo_format: 0,
            npot_textures: false,
            use_shaders: false,
            shader_file: String::new(),
        }
    }
}

impl GpuSettings {
    /// The shader preset to load, if shaders are enabled and a path is set
    pub fn shader_preset(&self) -> Option<&str> {
        if self.use_shaders && !self.shader_file.is_empty() {
            Some(&self.shader_file)
        } else {
            None
        }
    }
}

/// Sound settings
#[derive(Debug, Clone, PartialEq)]
pub struct SoundSettings {
    pub mute: bool,
    pub mute_during_turbo: bool,
    /// Buffer size in milliseconds
    pub buffer_size_ms: u32,
    pub driver: u32,
    pub input_rate: u32,
    pub dynamic_rate_control: bool,
    /// 1..=1000
    pub dynamic_rate_limit: u32,
    /// Guess the input rate from the monitor refresh rate
    pub auto_input_rate: bool,
    pub sixteen_bit: bool,
    pub stereo: bool,
    pub reverse_stereo: bool,
    /// Index into the playback rate table, 1..=7
    pub playback_rate: u32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            mute: false,
            mute_during_turbo: false,
            buffer_size_ms: 32,
            driver: 0,
            input_rate: 31950,
            dynamic_rate_control: false,
            dynamic_rate_limit: 5,
            auto_input_rate: true,
            sixteen_bit: true,
            stereo: true,
            reverse_stereo: false,
            playback_rate: 5,
        }
    }
}

impl SoundSettings {
    const PLAYBACK_RATES: [u32; 7] = [8000, 11025, 16000, 22050, 32000, 44100, 48000];

    /// Output sample rate in Hz
    pub fn playback_rate_hz(&self) -> u32 {
        self.playback_rate
            .checked_sub(1)
            .and_then(|i| Self::PLAYBACK_RATES.get(i as usize))
            .copied()
            .unwrap_or(32000)
    }
}

/// Remembered directories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSettings {
    pub last_directory: PathBuf,
    pub last_shader_directory: PathBuf,
    pub sram_directory: PathBuf,
    pub savestate_directory: PathBuf,
    pub cheat_directory: PathBuf,
    pub patch_directory: PathBuf,
    pub export_directory: PathBuf,
}

/// Window geometry and visibility
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    /// -1 lets the window manager decide
    pub main_width: i32,
    pub main_height: i32,
    pub preferences_width: i32,
    pub preferences_height: i32,
    pub ui_visible: bool,
    pub statusbar_visible: bool,
    pub fullscreen: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            main_width: -1,
            main_height: -1,
            preferences_width: -1,
            preferences_height: -1,
            ui_visible: true,
            statusbar_visible: false,
            fullscreen: false,
        }
    }
}

/// Netplay settings
#[derive(Debug, Clone, PartialEq)]
pub struct NetplaySettings {
    pub is_server: bool,
    pub sync_reset: bool,
    pub send_rom: bool,
    pub default_port: u16,
    pub max_frame_loss: u32,
    pub last_port: u16,
    pub last_rom: String,
    pub last_host: String,
}

impl Default for NetplaySettings {
    fn default() -> Self {
        Self {
            is_server: false,
            sync_reset: true,
            send_rom: false,
            default_port: 6096,
            max_frame_loss: 10,
            last_port: 6096,
            last_rom: String::new(),
            last_host: String::new(),
        }
    }
}

/// Frontend behavior toggles
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSettings {
    pub pause_on_focus_loss: bool,
    pub esc_behavior: EscBehavior,
    pub prevent_screensaver: bool,
    pub modal_dialogs: bool,
    /// Rewind memory in megabytes
    pub rewind_buffer_size: u32,
    /// Only save rewind snapshots every N frames
    pub rewind_granularity: u32,
    pub current_save_slot: u32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            pause_on_focus_loss: false,
            esc_behavior: EscBehavior::ExitFullscreen,
            prevent_screensaver: false,
            modal_dialogs: true,
            rewind_buffer_size: 0,
            rewind_granularity: 5,
            current_save_slot: 0,
        }
    }
}

/// Emulation options handed to the core
#[derive(Debug, Clone, PartialEq)]
pub struct EmulationSettings {
    pub transparency: bool,
    pub display_frame_rate: bool,
    pub speed_control: ThrottleMode,
    /// Save SRAM every N seconds, 0 disables
    pub auto_save_delay: u32,
    pub block_invalid_vram_access: bool,
    /// Allow up+down or left+right at the same time
    pub allow_dpad_contradictions: bool,
    /// Derived from `speed_control`
    pub sound_sync: bool,
}

impl Default for EmulationSettings {
    fn default() -> Self {
        Self {
            transparency: true,
            display_frame_rate: false,
            speed_control: ThrottleMode::Timer,
            auto_save_delay: 0,
            block_invalid_vram_access: true,
            allow_dpad_contradictions: false,
            sound_sync: false,
        }
    }
}

/// CPU memory access timings, in master clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockCycles {
    pub one: u32,
    pub one_slow: u32,
    pub two: u32,
}

impl ClockCycles {
    pub const STANDARD: ClockCycles = ClockCycles {
        one: 6,
        one_slow: 8,
        two: 12,
    };

    pub const OVERCLOCKED: ClockCycles = ClockCycles {
        one: 4,
        one_slow: 5,
        two: 6,
    };
}

/// Accuracy trade-offs
#[derive(Debug, Clone, PartialEq)]
pub struct HackSettings {
    /// Percent of the stock SuperFX clock, 50..=400
    pub superfx_clock_multiplier: u32,
    pub interpolation: Interpolation,
    /// Derived from the remove-sprite-limit flag
    pub max_sprite_tiles_per_line: u32,
    /// Derived from the overclock flag
    pub clock: ClockCycles,
}

impl Default for HackSettings {
    fn default() -> Self {
        Self {
            superfx_clock_multiplier: 100,
            interpolation: Interpolation::Gaussian,
            max_sprite_tiles_per_line: SPRITE_TILES_LIMITED,
            clock: ClockCycles::STANDARD,
        }
    }
}

impl HackSettings {
    pub fn sprite_limit_removed(&self) -> bool {
        self.max_sprite_tiles_per_line != SPRITE_TILES_LIMITED
    }

    pub fn set_sprite_limit_removed(&mut self, removed: bool) {
        self.max_sprite_tiles_per_line = if removed {
            SPRITE_TILES_UNLIMITED
        } else {
            SPRITE_TILES_LIMITED
        };
    }

    pub fn cpu_overclocked(&self) -> bool {
        self.clock.one != ClockCycles::STANDARD.one
    }

    pub fn set_cpu_overclocked(&mut self, overclocked: bool) {
        self.clock = if overclocked {
            ClockCycles::OVERCLOCKED
        } else {
            ClockCycles::STANDARD
        };
    }
}

/// Controller port assignment and joystick tuning
#[derive(Debug, Clone, PartialEq)]
pub struct InputSettings {
    pub ports: [ControllerType; 2],
    /// Axis deflection, in percent, that counts as a press
    pub joystick_threshold: u8,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            ports: [ControllerType::Joypad, ControllerType::Joypad],
            joystick_threshold: 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.display.scale_to_fit);
        assert_eq!(settings.display.aspect_ratio, AspectRatio::FourThree);
        assert_eq!(settings.sound.input_rate, 31950);
        assert_eq!(settings.netplay.default_port, 6096);
        assert_eq!(settings.hacks.max_sprite_tiles_per_line, 34);
        assert_eq!(settings.hacks.clock, ClockCycles::STANDARD);
        assert_eq!(settings.window.main_width, -1);
        assert!(settings.shortcuts.iter().all(|b| b.is_none()));
        assert!(settings.pads[1].iter().all(|b| b.is_none()));
        assert_eq!(settings.pads[0][0], Binding::key(KeyCode::ArrowUp));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut settings = Settings::default();
        settings.sound.mute = true;
        settings.gpu.shader_file = "crt.slangp".to_string();
        settings.reset();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_aspect_ratio_index_clamps() {
        assert_eq!(AspectRatio::from_index(-3), AspectRatio::Uncorrected);
        assert_eq!(AspectRatio::from_index(9), AspectRatio::TvInteger);
        for i in 0..=AspectRatio::MAX_INDEX {
            assert_eq!(AspectRatio::from_index(i).index(), i);
        }
    }

    #[test]
    fn test_throttle_mode_timer_based() {
        assert!(ThrottleMode::Timer.is_timer_based());
        assert!(ThrottleMode::TimerFrameskip.is_timer_based());
        assert!(!ThrottleMode::SoundSync.is_timer_based());
        assert!(!ThrottleMode::None.is_timer_based());
        assert_eq!(ThrottleMode::from_index(42), ThrottleMode::Timer);
    }

    #[test]
    fn test_derived_hack_flags() {
        let mut hacks = HackSettings::default();
        assert!(!hacks.sprite_limit_removed());
        hacks.set_sprite_limit_removed(true);
        assert_eq!(hacks.max_sprite_tiles_per_line, 128);
        assert!(hacks.sprite_limit_removed());

        hacks.set_cpu_overclocked(true);
        assert_eq!(hacks.clock, ClockCycles::OVERCLOCKED);
        assert!(hacks.cpu_overclocked());
    }

    #[test]
    fn test_playback_rate_hz() {
        let mut sound = SoundSettings::default();
        assert_eq!(sound.playback_rate_hz(), 32000);
        sound.playback_rate = 7;
        assert_eq!(sound.playback_rate_hz(), 48000);
        sound.playback_rate = 0;
        assert_eq!(sound.playback_rate_hz(), 32000);
    }

    #[test]
    fn test_shader_preset_requires_flag() {
        let mut gpu = GpuSettings::default();
        gpu.shader_file = "crt.slangp".to_string();
        assert_eq!(gpu.shader_preset(), None);
        gpu.use_shaders = true;
        assert_eq!(gpu.shader_preset(), Some("crt.slangp"));
    }
}
