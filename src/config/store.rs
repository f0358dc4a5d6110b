// Configuration store
//
// Loads and saves the `Settings` record through the sectioned configuration
// file, owns post-load validation, and re-registers input bindings with the
// input dispatcher after the settings change.

use super::error::ConfigError;
use super::file::ConfFile;
use super::paths::{config_dir_from_env, CONFIG_FILE_NAME};
use super::settings::{
    AspectRatio, EscBehavior, HiresEffect, Interpolation, Settings, ThrottleMode,
    SCALE_FILTER_COUNT,
};
use crate::input::{
    command_for, Binding, ControllerRegistry, ControllerType, InputDispatch, PortAssignment,
    JOYPAD_LINKS, NUM_PORTS, SHORTCUT_LINKS,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Pads sharing a binding table wrap onto this many controller commands
const JOYPAD_COMMAND_PADS: usize = 5;

/// Pointer commands registered on every rebind
const POINTER_COMMAND: &str = "Pointer Mouse1+Superscope+Justifier1";

/// Mouse button commands registered on every rebind, indexed by button
const MOUSE_BUTTON_COMMANDS: [&str; 3] = [
    "{Mouse1 L,Superscope Fire,Justifier1 Trigger}",
    "{Justifier1 AimOffscreen Trigger,Superscope AimOffscreen}",
    "{Mouse1 R,Superscope Cursor,Justifier1 Start}",
];

/// Reads and writes settings in a configuration directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the directory resolved from `HOME`/`XDG_CONFIG_HOME`
    pub fn new() -> Self {
        Self::with_dir(config_dir_from_env())
    }

    /// Store rooted at an explicit directory
    pub fn with_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of `snes9x.conf`
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Reset every setting to its default value
    pub fn load_defaults(settings: &mut Settings) {
        settings.reset();
    }

    /// Load settings from the configuration file
    ///
    /// Settings are reset first, so keys the file lacks keep their defaults.
    /// A missing file is created from the defaults. Only filesystem failures
    /// are errors; malformed keys are ignored.
    pub fn load_config_file(&self, settings: &mut Settings) -> Result<(), ConfigError> {
        Self::load_defaults(settings);

        self.ensure_dir().inspect_err(|e| log::error!("{}", e))?;

        let path = self.config_file();
        if !path.exists() {
            log::info!("No config file at {}, writing defaults", path.display());
            self.save_config_file(settings)?;
        }

        let conf = ConfFile::load(&path)
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })
            .inspect_err(|e| log::error!("{}", e))?;

        read_settings(&conf, settings);
        validate(settings);

        log::info!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Write every setting to the configuration file, replacing it
    pub fn save_config_file(&self, settings: &Settings) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        let path = self.config_file();
        let mut conf = write_settings(settings);
        conf.set_nice_alignment(true);
        conf.set_show_comments(true);

        conf.save_to(&path)
            .map_err(|source| ConfigError::Write { path, source })
            .inspect_err(|e| log::error!("{}", e))
    }

    /// Re-register every binding with the input dispatcher
    ///
    /// Existing mappings are dropped first. Unset bindings and commands the
    /// dispatcher does not know are skipped.
    pub fn rebind_keys(settings: &Settings, dispatch: &mut dyn InputDispatch) {
        dispatch.unmap_all();

        for (i, pad) in settings.pads.iter().enumerate() {
            for (binding, link) in pad.iter().zip(JOYPAD_LINKS) {
                let descriptor = format!("Joypad{} {}", (i % JOYPAD_COMMAND_PADS) + 1, link);
                map_button(dispatch, *binding, &descriptor, false);
            }
        }

        for (binding, link) in settings.shortcuts.iter().zip(SHORTCUT_LINKS) {
            map_button(dispatch, *binding, link, false);
        }

        if let Some(command) = command_for(POINTER_COMMAND) {
            dispatch.map_pointer(Binding::MousePointer, command, true);
        }

        for (button, descriptor) in MOUSE_BUTTON_COMMANDS.iter().enumerate() {
            map_button(dispatch, Binding::MouseButton(button as u8), descriptor, false);
        }
    }

    /// Plug the configured controllers into the emulated ports
    pub fn apply_controller_ports(settings: &Settings, registry: &mut dyn ControllerRegistry) {
        for (port, kind) in settings.input.ports.iter().enumerate() {
            registry.set_controller(port, PortAssignment::for_port(*kind, port));
        }
    }

    /// Record the controllers currently plugged into the emulated ports
    pub fn capture_controller_ports(settings: &mut Settings, registry: &dyn ControllerRegistry) {
        for (port, kind) in settings.input.ports.iter_mut().enumerate() {
            *kind = registry.controller(port).kind;
        }
    }

    fn ensure_dir(&self) -> Result<(), ConfigError> {
        let err = |source| ConfigError::CreateDir {
            path: self.dir.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o755)).map_err(err)?;
        }

        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

fn map_button(dispatch: &mut dyn InputDispatch, binding: Binding, descriptor: &str, poll: bool) {
    if binding.is_none() {
        return;
    }
    match command_for(descriptor) {
        Some(command) => {
            dispatch.map_button(binding, command, poll);
        }
        None => log::debug!("No command named '{}', binding skipped", descriptor),
    }
}

fn read_bool(conf: &ConfFile, key: &str, slot: &mut bool) {
    if let Some(value) = conf.get_bool(key) {
        *slot = value;
    }
}

/// Read an integer; values that don't fit the field keep the current value
fn read_int<T: TryFrom<i64>>(conf: &ConfFile, key: &str, slot: &mut T) {
    if let Some(value) = conf.get_int(key).and_then(|v| T::try_from(v).ok()) {
        *slot = value;
    }
}

fn read_float(conf: &ConfFile, key: &str, slot: &mut f64) {
    if let Some(value) = conf.get_float(key) {
        *slot = value;
    }
}

fn read_string(conf: &ConfFile, key: &str, slot: &mut String) {
    if let Some(value) = conf.get_string(key) {
        *slot = value;
    }
}

fn read_path(conf: &ConfFile, key: &str, slot: &mut PathBuf) {
    if let Some(value) = conf.get_string(key) {
        *slot = PathBuf::from(value);
    }
}

/// Read an integer and clamp it into `range`
fn read_clamped<T: TryFrom<i64>>(
    conf: &ConfFile,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    slot: &mut T,
) {
    if let Some(value) = conf.get_int(key) {
        if let Ok(value) = T::try_from(value.clamp(*range.start(), *range.end())) {
            *slot = value;
        }
    }
}

/// Read a binding; an entry that is present but unparsable unsets it
fn read_binding(conf: &ConfFile, key: &str, slot: &mut Binding) {
    if conf.exists(key) {
        *slot = conf.get_as(key).unwrap_or_default();
    }
}

fn read_settings(conf: &ConfFile, s: &mut Settings) {
    let d = &mut s.display;
    read_bool(conf, "Display::FullscreenOnOpen", &mut d.full_screen_on_open);
    read_bool(conf, "Display::ChangeDisplayResolution", &mut d.change_display_resolution);
    read_int(conf, "Display::VideoMode", &mut d.video_mode);
    read_bool(conf, "Display::ScaleToFit", &mut d.scale_to_fit);
    read_bool(conf, "Display::MaintainAspectRatio", &mut d.maintain_aspect_ratio);
    if let Some(index) = conf.get_int("Display::AspectRatio") {
        d.aspect_ratio = AspectRatio::from_index(index);
    }
    read_int(conf, "Display::SoftwareScaleFilter", &mut d.scale_method);
    read_clamped(conf, "Display::ScanlineFilterIntensity", 0..=3, &mut d.scanline_filter_intensity);
    read_bool(conf, "Display::ShowOverscanArea", &mut d.overscan);
    if let Some(index) = conf.get_int("Display::HiresEffect") {
        d.hires_effect = HiresEffect::from_index(index);
    }
    read_bool(conf, "Display::ForceInvertedByteOrder", &mut d.force_inverted_byte_order);
    read_bool(conf, "Display::Multithreading", &mut d.multithreading);
    read_int(conf, "Display::NumberOfThreads", &mut d.num_threads);
    read_int(conf, "Display::HardwareAcceleration", &mut d.hardware_acceleration);
    read_bool(conf, "Display::BilinearFilter", &mut d.bilinear_filter);

    let n = &mut s.ntsc;
    read_float(conf, "NTSC::Hue", &mut n.hue);
    read_float(conf, "NTSC::Saturation", &mut n.saturation);
    read_float(conf, "NTSC::Contrast", &mut n.contrast);
    read_float(conf, "NTSC::Brightness", &mut n.brightness);
    read_float(conf, "NTSC::Sharpness", &mut n.sharpness);
    read_float(conf, "NTSC::Artifacts", &mut n.artifacts);
    read_float(conf, "NTSC::Gamma", &mut n.gamma);
    read_float(conf, "NTSC::Bleed", &mut n.bleed);
    read_float(conf, "NTSC::Fringing", &mut n.fringing);
    read_float(conf, "NTSC::Resolution", &mut n.resolution);
    read_bool(conf, "NTSC::MergeFields", &mut n.merge_fields);
    read_clamped(conf, "NTSC::ScanlineIntensity", 0..=4, &mut n.scanline_intensity);

    let g = &mut s.gpu;
    read_bool(conf, "OpenGL::VSync", &mut g.sync_to_vblank);
    read_bool(conf, "OpenGL::ReduceInputLag", &mut g.reduce_input_lag);
    read_bool(conf, "OpenGL::UsePixelBufferObjects", &mut g.use_pbos);
    read_int(conf, "OpenGL::PixelBufferObjectBitDepth", &mut g.pbo_format);
    read_bool(conf, "OpenGL::UseNonPowerOfTwoTextures", &mut g.npot_textures);
    read_bool(conf, "OpenGL::EnableCustomShaders", &mut g.use_shaders);
    read_string(conf, "OpenGL::ShaderFile", &mut g.shader_file);

    let a = &mut s.sound;
    read_bool(conf, "Sound::MuteSound", &mut a.mute);
    read_bool(conf, "Sound::MuteSoundDuringTurbo", &mut a.mute_during_turbo);
    read_int(conf, "Sound::BufferSize", &mut a.buffer_size_ms);
    read_int(conf, "Sound::Driver", &mut a.driver);
    read_int(conf, "Sound::InputRate", &mut a.input_rate);
    read_bool(conf, "Sound::DynamicRateControl", &mut a.dynamic_rate_control);
    read_clamped(conf, "Sound::DynamicRateControlLimit", 1..=1000, &mut a.dynamic_rate_limit);
    read_bool(conf, "Sound::AutomaticInputRate", &mut a.auto_input_rate);
    read_bool(conf, "Sound::16bit", &mut a.sixteen_bit);
    read_bool(conf, "Sound::Stereo", &mut a.stereo);
    read_bool(conf, "Sound::ReverseStereo", &mut a.reverse_stereo);
    read_int(conf, "Sound::PlaybackRate", &mut a.playback_rate);

    let f = &mut s.files;
    read_path(conf, "Files::LastDirectory", &mut f.last_directory);
    read_path(conf, "Files::LastShaderDirectory", &mut f.last_shader_directory);
    read_path(conf, "Files::SRAMDirectory", &mut f.sram_directory);
    read_path(conf, "Files::SaveStateDirectory", &mut f.savestate_directory);
    read_path(conf, "Files::CheatDirectory", &mut f.cheat_directory);
    read_path(conf, "Files::PatchDirectory", &mut f.patch_directory);
    read_path(conf, "Files::ExportDirectory", &mut f.export_directory);

    let w = &mut s.window;
    read_int(conf, "Window State::MainWidth", &mut w.main_width);
    read_int(conf, "Window State::MainHeight", &mut w.main_height);
    read_int(conf, "Window State::PreferencesWidth", &mut w.preferences_width);
    read_int(conf, "Window State::PreferencesHeight", &mut w.preferences_height);
    read_bool(conf, "Window State::UIVisible", &mut w.ui_visible);
    read_bool(conf, "Window State::StatusBarVisible", &mut w.statusbar_visible);
    read_bool(conf, "Window State::Fullscreen", &mut w.fullscreen);

    let p = &mut s.netplay;
    read_bool(conf, "Netplay::ActAsServer", &mut p.is_server);
    read_bool(conf, "Netplay::UseResetToSync", &mut p.sync_reset);
    read_bool(conf, "Netplay::SendROM", &mut p.send_rom);
    read_int(conf, "Netplay::DefaultPort", &mut p.default_port);
    read_int(conf, "Netplay::MaxFrameLoss", &mut p.max_frame_loss);
    read_int(conf, "Netplay::LastUsedPort", &mut p.last_port);
    read_string(conf, "Netplay::LastUsedROM", &mut p.last_rom);
    read_string(conf, "Netplay::LastUsedHost", &mut p.last_host);

    let b = &mut s.behavior;
    read_bool(conf, "Behavior::PauseEmulationWhenFocusLost", &mut b.pause_on_focus_loss);
    if let Some(index) = conf.get_int("Behavior::DefaultESCKeyBehavior") {
        b.esc_behavior = EscBehavior::from_index(index);
    }
    read_bool(conf, "Behavior::PreventScreensaver", &mut b.prevent_screensaver);
    read_bool(conf, "Behavior::UseModalDialogs", &mut b.modal_dialogs);
    read_int(conf, "Behavior::RewindBufferSize", &mut b.rewind_buffer_size);
    read_int(conf, "Behavior::RewindGranularity", &mut b.rewind_granularity);
    read_int(conf, "Behavior::CurrentSaveSlot", &mut b.current_save_slot);

    let e = &mut s.emulation;
    read_bool(conf, "Emulation::EmulateTransparency", &mut e.transparency);
    read_bool(conf, "Emulation::DisplayFrameRate", &mut e.display_frame_rate);
    if let Some(index) = conf.get_int("Emulation::SpeedControlMethod") {
        e.speed_control = ThrottleMode::from_index(index);
    }
    read_int(conf, "Emulation::SaveSRAMEveryNSeconds", &mut e.auto_save_delay);
    read_bool(conf, "Emulation::BlockInvalidVRAMAccess", &mut e.block_invalid_vram_access);
    read_bool(conf, "Emulation::AllowDPadContradictions", &mut e.allow_dpad_contradictions);

    let h = &mut s.hacks;
    read_clamped(conf, "Hacks::SuperFXClockMultiplier", 50..=400, &mut h.superfx_clock_multiplier);
    if let Some(index) = conf.get_int("Hacks::SoundInterpolationMethod") {
        h.interpolation = Interpolation::from_index(index);
    }
    if let Some(removed) = conf.get_bool("Hacks::RemoveSpriteLimit") {
        h.set_sprite_limit_removed(removed);
    }
    if let Some(overclocked) = conf.get_bool("Hacks::OverclockCPU") {
        h.set_cpu_overclocked(overclocked);
    }

    for port in 0..NUM_PORTS {
        let key = format!("Input::ControllerPort{}", port);
        if let Some(kind) = conf.get_string(&key).as_deref().and_then(ControllerType::from_config) {
            s.input.ports[port] = kind;
        }
    }
    read_int(conf, "Input::JoystickThreshold", &mut s.input.joystick_threshold);

    for (i, pad) in s.pads.iter_mut().enumerate() {
        for (slot, link) in pad.iter_mut().zip(JOYPAD_LINKS) {
            read_binding(conf, &format!("Joypad {}::{}", i, link), slot);
        }
    }

    for (slot, link) in s.shortcuts.iter_mut().zip(SHORTCUT_LINKS) {
        read_binding(conf, &format!("Shortcuts::{}", link), slot);
    }
}

/// Enforce the relationships between settings after a load
fn validate(s: &mut Settings) {
    if !s.fullscreen_persists() {
        s.window.fullscreen = false;
    }

    if s.display.scale_method >= SCALE_FILTER_COUNT {
        s.display.scale_method = 0;
    }

    if s.gpu.pbo_format != 32 {
        s.gpu.pbo_format = 16;
    }

    s.emulation.sound_sync = s.emulation.speed_control == ThrottleMode::SoundSync;
}

fn write_settings(s: &Settings) -> ConfFile {
    let mut conf = ConfFile::new();

    let d = &s.display;
    conf.set_bool(
        "Display::FullscreenOnOpen",
        d.full_screen_on_open,
        "Set the screen resolution after opening a ROM",
    );
    conf.set_bool(
        "Display::ChangeDisplayResolution",
        d.change_display_resolution,
        "Set the resolution in fullscreen mode",
    );
    conf.set_int("Display::VideoMode", d.video_mode, "Platform-specific video mode number");
    conf.set_bool("Display::ScaleToFit", d.scale_to_fit, "Scale the image to fit the window size");
    conf.set_bool(
        "Display::MaintainAspectRatio",
        d.maintain_aspect_ratio,
        "Resize the screen to the proportions set by aspect ratio option",
    );
    conf.set_int(
        "Display::AspectRatio",
        d.aspect_ratio.index(),
        "0: uncorrected, 1: uncorrected integer scale, 2: 4:3, 3: 4/3 integer scale, 4: NTSC/PAL, 5: NTSC/PAL integer scale",
    );
    conf.set_int(
        "Display::SoftwareScaleFilter",
        d.scale_method.into(),
        "Build-specific number of filter used for software scaling",
    );
    conf.set_int(
        "Display::ScanlineFilterIntensity",
        d.scanline_filter_intensity.into(),
        "0: 12.5%, 1: 25%, 2: 50%, 3: 100%",
    );
    conf.set_bool("Display::ShowOverscanArea", d.overscan, "");
    conf.set_int(
        "Display::HiresEffect",
        d.hires_effect.index(),
        "0: Downscale to low-res, 1: Leave as-is, 2: Upscale low-res screens",
    );
    conf.set_bool("Display::ForceInvertedByteOrder", d.force_inverted_byte_order, "");
    conf.set_bool(
        "Display::Multithreading",
        d.multithreading,
        "Apply filters using multiple threads",
    );
    conf.set_int("Display::NumberOfThreads", d.num_threads.into(), "");
    conf.set_int(
        "Display::HardwareAcceleration",
        d.hardware_acceleration.into(),
        "0: None, 1: GPU",
    );
    conf.set_bool("Display::BilinearFilter", d.bilinear_filter, "Smoothes scaled image");

    let n = &s.ntsc;
    conf.set_float("NTSC::Hue", n.hue, "");
    conf.set_float("NTSC::Saturation", n.saturation, "");
    conf.set_float("NTSC::Contrast", n.contrast, "");
    conf.set_float("NTSC::Brightness", n.brightness, "");
    conf.set_float("NTSC::Sharpness", n.sharpness, "");
    conf.set_float("NTSC::Artifacts", n.artifacts, "");
    conf.set_float("NTSC::Gamma", n.gamma, "");
    conf.set_float("NTSC::Bleed", n.bleed, "");
    conf.set_float("NTSC::Fringing", n.fringing, "");
    conf.set_float("NTSC::Resolution", n.resolution, "");
    conf.set_bool("NTSC::MergeFields", n.merge_fields, "");
    conf.set_int(
        "NTSC::ScanlineIntensity",
        n.scanline_intensity.into(),
        "0: 0%, 1: 12.5%, 2: 25%, 3: 50%, 4: 100%",
    );

    let g = &s.gpu;
    conf.set_bool("OpenGL::VSync", g.sync_to_vblank, "");
    conf.set_bool(
        "OpenGL::ReduceInputLag",
        g.reduce_input_lag,
        "Wait for the GPU after every frame",
    );
    conf.set_bool("OpenGL::UsePixelBufferObjects", g.use_pbos, "");
    conf.set_int("OpenGL::PixelBufferObjectBitDepth", g.pbo_format.into(), "16 or 32");
    conf.set_bool("OpenGL::UseNonPowerOfTwoTextures", g.npot_textures, "");
    conf.set_bool("OpenGL::EnableCustomShaders", g.use_shaders, "");
    conf.set_string(
        "OpenGL::ShaderFile",
        &g.shader_file,
        "Shader preset to load when custom shaders are enabled",
    );

    let a = &s.sound;
    conf.set_bool("Sound::MuteSound", a.mute, "");
    conf.set_bool("Sound::MuteSoundDuringTurbo", a.mute_during_turbo, "");
    conf.set_int("Sound::BufferSize", a.buffer_size_ms.into(), "Buffer size in milliseconds");
    conf.set_int("Sound::Driver", a.driver.into(), "");
    conf.set_int("Sound::InputRate", a.input_rate.into(), "");
    conf.set_bool("Sound::DynamicRateControl", a.dynamic_rate_control, "");
    conf.set_int("Sound::DynamicRateControlLimit", a.dynamic_rate_limit.into(), "1 to 1000");
    conf.set_bool(
        "Sound::AutomaticInputRate",
        a.auto_input_rate,
        "Guess input rate by asking the monitor what its refresh rate is",
    );
    conf.set_bool("Sound::16bit", a.sixteen_bit, "");
    conf.set_bool("Sound::Stereo", a.stereo, "");
    conf.set_bool("Sound::ReverseStereo", a.reverse_stereo, "");
    conf.set_int(
        "Sound::PlaybackRate",
        a.playback_rate.into(),
        "1: 8000Hz, 2: 11025Hz, 3: 16000Hz, 4: 22050Hz, 5: 32000Hz, 6: 44100Hz, 7: 48000Hz",
    );

    let f = &s.files;
    let path = |p: &PathBuf| p.to_string_lossy().into_owned();
    conf.set_string("Files::LastDirectory", &path(&f.last_directory), "");
    conf.set_string("Files::LastShaderDirectory", &path(&f.last_shader_directory), "");
    conf.set_string("Files::SRAMDirectory", &path(&f.sram_directory), "");
    conf.set_string("Files::SaveStateDirectory", &path(&f.savestate_directory), "");
    conf.set_string("Files::CheatDirectory", &path(&f.cheat_directory), "");
    conf.set_string("Files::PatchDirectory", &path(&f.patch_directory), "");
    conf.set_string("Files::ExportDirectory", &path(&f.export_directory), "");

    let w = &s.window;
    conf.set_int("Window State::MainWidth", w.main_width.into(), "");
    conf.set_int("Window State::MainHeight", w.main_height.into(), "");
    conf.set_int("Window State::PreferencesWidth", w.preferences_width.into(), "");
    conf.set_int("Window State::PreferencesHeight", w.preferences_height.into(), "");
    conf.set_bool("Window State::UIVisible", w.ui_visible, "");
    conf.set_bool("Window State::StatusBarVisible", w.statusbar_visible, "");
    conf.set_bool("Window State::Fullscreen", w.fullscreen && s.fullscreen_persists(), "");

    let p = &s.netplay;
    conf.set_bool("Netplay::ActAsServer", p.is_server, "");
    conf.set_bool("Netplay::UseResetToSync", p.sync_reset, "");
    conf.set_bool("Netplay::SendROM", p.send_rom, "");
    conf.set_int("Netplay::DefaultPort", p.default_port.into(), "");
    conf.set_int("Netplay::MaxFrameLoss", p.max_frame_loss.into(), "");
    conf.set_int("Netplay::LastUsedPort", p.last_port.into(), "");
    conf.set_string("Netplay::LastUsedROM", &p.last_rom, "");
    conf.set_string("Netplay::LastUsedHost", &p.last_host, "");

    let b = &s.behavior;
    conf.set_bool("Behavior::PauseEmulationWhenFocusLost", b.pause_on_focus_loss, "");
    conf.set_int(
        "Behavior::DefaultESCKeyBehavior",
        b.esc_behavior.index(),
        "0: Toggle the menu bar, 1: Exit fullscreen, 2: Quit",
    );
    conf.set_bool("Behavior::PreventScreensaver", b.prevent_screensaver, "");
    conf.set_bool("Behavior::UseModalDialogs", b.modal_dialogs, "");
    conf.set_int(
        "Behavior::RewindBufferSize",
        b.rewind_buffer_size.into(),
        "Amount of memory (in MB) to use for rewinding",
    );
    conf.set_int(
        "Behavior::RewindGranularity",
        b.rewind_granularity.into(),
        "Only save rewind snapshots every N frames",
    );
    conf.set_int("Behavior::CurrentSaveSlot", b.current_save_slot.into(), "");

    let e = &s.emulation;
    conf.set_bool("Emulation::EmulateTransparency", e.transparency, "");
    conf.set_bool("Emulation::DisplayFrameRate", e.display_frame_rate, "");
    conf.set_int(
        "Emulation::SpeedControlMethod",
        e.speed_control.index(),
        "0: Time the frames to 50 or 60Hz, 1: Same, but skip frames if too slow, 2: Synchronize to the sound buffer, 3: Unlimited, except potentially by vsync",
    );
    conf.set_int("Emulation::SaveSRAMEveryNSeconds", e.auto_save_delay.into(), "");
    conf.set_bool("Emulation::BlockInvalidVRAMAccess", e.block_invalid_vram_access, "");
    conf.set_bool(
        "Emulation::AllowDPadContradictions",
        e.allow_dpad_contradictions,
        "Allow the D-Pad to press both up + down at the same time, or left + right",
    );

    let h = &s.hacks;
    conf.set_int("Hacks::SuperFXClockMultiplier", h.superfx_clock_multiplier.into(), "50 to 400");
    conf.set_int(
        "Hacks::SoundInterpolationMethod",
        h.interpolation.index(),
        "0: None, 1: Linear, 2: Gaussian (what the hardware uses), 3: Cubic, 4: Sinc",
    );
    conf.set_bool("Hacks::RemoveSpriteLimit", h.sprite_limit_removed(), "");
    conf.set_bool("Hacks::OverclockCPU", h.cpu_overclocked(), "");

    for (port, kind) in s.input.ports.iter().enumerate() {
        conf.set_string(&format!("Input::ControllerPort{}", port), kind.name(), "");
    }
    conf.set_int("Input::JoystickThreshold", s.input.joystick_threshold.into(), "");

    for (i, pad) in s.pads.iter().enumerate() {
        for (binding, link) in pad.iter().zip(JOYPAD_LINKS) {
            conf.set_string(&format!("Joypad {}::{}", i, link), &binding.to_string(), "");
        }
    }

    for (binding, link) in s.shortcuts.iter().zip(SHORTCUT_LINKS) {
        conf.set_string(&format!("Shortcuts::{}", link), &binding.to_string(), "");
    }

    conf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ClockCycles;
    use crate::input::{ControlMap, ControllerPorts, Shortcut};
    use winit::keyboard::KeyCode;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::with_dir(dir.path().join("snes9x"));
        (dir, store)
    }

    fn load_text(text: &str) -> Settings {
        let (_dir, store) = store();
        fs::create_dir_all(store.config_dir()).unwrap();
        fs::write(store.config_file(), text).unwrap();
        let mut settings = Settings::default();
        store.load_config_file(&mut settings).unwrap();
        settings
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let (_dir, store) = store();
        let mut settings = Settings::default();
        settings.sound.mute = true;

        store.load_config_file(&mut settings).unwrap();

        assert!(store.config_file().exists());
        let mut expected = Settings::default();
        validate(&mut expected);
        assert_eq!(settings, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_mode() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = store();
        store.load_config_file(&mut Settings::default()).unwrap();
        let mode = fs::metadata(store.config_dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let settings = load_text("[Sound]\nInputRate = 32000\n");
        assert_eq!(settings.sound.input_rate, 32000);
        assert_eq!(settings.sound.buffer_size_ms, 32);
        assert_eq!(settings.pads[0][0], Binding::key(KeyCode::ArrowUp));
    }

    #[test]
    fn test_unparsable_binding_is_unset() {
        let settings = load_text("[\"Joypad 0\"]\nUp = \"Keyboard NotAKey\"\n");
        assert_eq!(settings.pads[0][0], Binding::None);
        assert_eq!(settings.pads[0][1], Binding::key(KeyCode::ArrowDown));
    }

    #[test]
    fn test_clamping() {
        let settings = load_text(
            "[Sound]\nDynamicRateControlLimit = 0\n[Hacks]\nSuperFXClockMultiplier = 1000\n[NTSC]\nScanlineIntensity = 9\n[Display]\nHiresEffect = -4\nScanlineFilterIntensity = 7\nAspectRatio = 12\n",
        );
        assert_eq!(settings.sound.dynamic_rate_limit, 1);
        assert_eq!(settings.hacks.superfx_clock_multiplier, 400);
        assert_eq!(settings.ntsc.scanline_intensity, 4);
        assert_eq!(settings.display.hires_effect, HiresEffect::Merge);
        assert_eq!(settings.display.scanline_filter_intensity, 3);
        assert_eq!(settings.display.aspect_ratio, AspectRatio::TvInteger);
    }

    #[test]
    fn test_clamping_opposite_bounds() {
        let settings = load_text(
            "[Sound]\nDynamicRateControlLimit = 5000\n[Hacks]\nSuperFXClockMultiplier = 10\n",
        );
        assert_eq!(settings.sound.dynamic_rate_limit, 1000);
        assert_eq!(settings.hacks.superfx_clock_multiplier, 50);

        let settings = load_text(
            "[Sound]\nDynamicRateControlLimit = 250\n[Hacks]\nSuperFXClockMultiplier = 150\n",
        );
        assert_eq!(settings.sound.dynamic_rate_limit, 250);
        assert_eq!(settings.hacks.superfx_clock_multiplier, 150);
    }

    #[test]
    fn test_derived_values() {
        let settings = load_text(
            "[Hacks]\nRemoveSpriteLimit = true\nOverclockCPU = true\n[Emulation]\nSpeedControlMethod = 2\n[OpenGL]\nPixelBufferObjectBitDepth = 24\n[Display]\nSoftwareScaleFilter = 15\n",
        );
        assert_eq!(settings.hacks.max_sprite_tiles_per_line, 128);
        assert_eq!(settings.hacks.clock, ClockCycles::OVERCLOCKED);
        assert!(settings.emulation.sound_sync);
        assert_eq!(settings.gpu.pbo_format, 16);
        assert_eq!(settings.display.scale_method, 0);
    }

    #[test]
    fn test_fullscreen_requires_menu_toggle() {
        let settings = load_text("[\"Window State\"]\nFullscreen = true\n");
        assert!(!settings.window.fullscreen);

        let settings = load_text(
            "[\"Window State\"]\nFullscreen = true\n[Behavior]\nDefaultESCKeyBehavior = 0\n",
        );
        assert!(settings.window.fullscreen);
    }

    #[test]
    fn test_save_writes_fullscreen_false_unless_persisted() {
        let mut settings = Settings::default();
        settings.window.fullscreen = true;
        let conf = write_settings(&settings);
        assert_eq!(conf.get_bool("Window State::Fullscreen"), Some(false));

        settings.behavior.esc_behavior = EscBehavior::ToggleMenuBar;
        let conf = write_settings(&settings);
        assert_eq!(conf.get_bool("Window State::Fullscreen"), Some(true));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_dir, store) = store();
        let mut settings = Settings::default();
        settings.display.aspect_ratio = AspectRatio::Tv;
        settings.ntsc.hue = -0.25;
        settings.gpu.shader_file = "/shaders/crt.slangp".to_string();
        settings.files.sram_directory = PathBuf::from("/saves");
        settings.netplay.last_host = "example.org".to_string();
        settings.hacks.set_sprite_limit_removed(true);
        settings.input.ports[1] = ControllerType::Multitap;
        settings.pads[3][7] = Binding::MouseButton(4);
        settings.shortcuts[Shortcut::from_name("Rewind").unwrap().index()] =
            Binding::key(KeyCode::Backspace);
        validate(&mut settings);

        store.save_config_file(&settings).unwrap();
        let mut loaded = Settings::default();
        store.load_config_file(&mut loaded).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_rebind_keys() {
        let mut settings = Settings::default();
        settings.pads[6][0] = Binding::key(KeyCode::KeyI);
        settings.shortcuts[Shortcut::from_name("Pause").unwrap().index()] =
            Binding::key(KeyCode::KeyP);

        let mut map = ControlMap::new();
        ConfigStore::rebind_keys(&settings, &mut map);

        // 12 default keys on pad 0, one on pad 6, one shortcut, three mouse buttons
        assert_eq!(map.button_count(), 12 + 1 + 1 + 3);
        assert_eq!(map.pointer_count(), 1);
        assert_eq!(
            map.button(&Binding::key(KeyCode::KeyI)),
            command_for("Joypad2 Up").as_ref()
        );
        assert_eq!(
            map.button(&Binding::key(KeyCode::KeyP)),
            command_for("Pause").as_ref()
        );
        assert_eq!(
            map.button(&Binding::MouseButton(1)),
            command_for(MOUSE_BUTTON_COMMANDS[1]).as_ref()
        );
    }

    #[test]
    fn test_controller_ports() {
        let mut settings = Settings::default();
        settings.input.ports = [ControllerType::Mouse, ControllerType::SuperScope];

        let mut registry = ControllerPorts::new();
        ConfigStore::apply_controller_ports(&settings, &mut registry);
        assert_eq!(registry.controller(1).kind, ControllerType::SuperScope);

        let mut captured = Settings::default();
        ConfigStore::capture_controller_ports(&mut captured, &registry);
        assert_eq!(captured.input.ports, settings.input.ports);
    }

    #[test]
    fn test_unreadable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let store = ConfigStore::with_dir(blocker.join("snes9x"));
        let err = store.load_config_file(&mut Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::CreateDir { .. }));
    }
}
