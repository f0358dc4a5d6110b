// Configuration store tests
// These tests load hand-written configuration files the way a user would
// leave them on disk, and check what the frontend sees afterwards.

use snes_frontend::config::{AspectRatio, ConfigStore, EscBehavior, Settings, ThrottleMode};
use snes_frontend::input::{Binding, Command, ControlMap, ControllerPorts, ControllerType};
use std::fs;
use winit::keyboard::KeyCode;

fn store_with(text: &str) -> (tempfile::TempDir, ConfigStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::with_dir(dir.path().join("snes9x"));
    fs::create_dir_all(store.config_dir()).unwrap();
    fs::write(store.config_file(), text).unwrap();
    (dir, store)
}

#[test]
fn test_load_hand_written_file() {
    let (_dir, store) = store_with(
        r#"
[Display]
ScaleToFit = false
AspectRatio = 2
BilinearFilter = false

[OpenGL]
VSync = false
EnableCustomShaders = true
ShaderFile = "/shaders/crt.preset"

["Window State"]
MainWidth = 800
MainHeight = 600

[Behavior]
DefaultESCKeyBehavior = 2

[Emulation]
SpeedControlMethod = 3

["Joypad 0"]
Up = "Keyboard KeyW"
Down = ""

[Shortcuts]
Pause = "Keyboard KeyP"
"#,
    );

    let mut settings = Settings::default();
    store.load_config_file(&mut settings).unwrap();

    assert!(!settings.display.scale_to_fit);
    assert_eq!(settings.display.aspect_ratio, AspectRatio::FourThree);
    assert!(!settings.gpu.sync_to_vblank);
    assert_eq!(settings.gpu.shader_preset(), Some("/shaders/crt.preset"));
    assert_eq!(settings.window.main_width, 800);
    assert_eq!(settings.window.main_height, 600);
    assert_eq!(settings.behavior.esc_behavior, EscBehavior::Quit);
    assert_eq!(settings.emulation.speed_control, ThrottleMode::None);

    assert_eq!(settings.pads[0][0], Binding::key(KeyCode::KeyW));
    assert_eq!(settings.pads[0][1], Binding::None);
    // Untouched entries keep the default layout
    assert_eq!(settings.pads[0][2], Binding::key(KeyCode::ArrowLeft));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let (_dir, store) = store_with(
        r#"
[Display]
ScaleToFit = false
this line is not a setting
MaintainAspectRatio = false

[Sound]
BufferSize = 96
"#,
    );

    let mut settings = Settings::default();
    store.load_config_file(&mut settings).unwrap();

    assert!(!settings.display.scale_to_fit);
    assert!(!settings.display.maintain_aspect_ratio);
    assert_eq!(settings.sound.buffer_size_ms, 96);
}

#[test]
fn test_saved_file_is_commented_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::with_dir(dir.path());

    let mut settings = Settings::default();
    settings.display.aspect_ratio = AspectRatio::TvInteger;
    settings.input.ports[1] = ControllerType::Multitap;
    settings.shortcuts[0] = Binding::key(KeyCode::F5);
    settings.shortcuts[1] = Binding::key(KeyCode::CapsLock);
    settings.pads[0][3] = Binding::key(KeyCode::IntlBackslash);
    settings.pads[1][0] = Binding::key(KeyCode::F13);
    store.save_config_file(&settings).unwrap();

    let text = fs::read_to_string(store.config_file()).unwrap();
    assert!(text.contains("[Display]"));
    assert!(text.contains("[\"Window State\"]"));
    assert!(text.contains('#'));

    let mut loaded = Settings::default();
    store.load_config_file(&mut loaded).unwrap();
    assert_eq!(loaded.display.aspect_ratio, AspectRatio::TvInteger);
    assert_eq!(loaded.input.ports[1], ControllerType::Multitap);
    assert_eq!(loaded.shortcuts[0], Binding::key(KeyCode::F5));
    assert_eq!(loaded.shortcuts[1], Binding::key(KeyCode::CapsLock));
    assert_eq!(loaded.pads, settings.pads);

    // A second pass through the file changes nothing
    store.save_config_file(&loaded).unwrap();
    let mut reloaded = Settings::default();
    store.load_config_file(&mut reloaded).unwrap();
    assert_eq!(reloaded, loaded);
}

#[test]
fn test_load_unquoted_legacy_file() {
    let (_dir, store) = store_with(
        "[Display]\nScaleToFit = false\n\n[Files]\nLastDirectory = /home/x/roms\n\n\
         [Joypad 0]\nUp = Keyboard KeyI\nDown = Keyboard Shift+KeyK\nLeft = not a binding\n",
    );

    let mut settings = Settings::default();
    store.load_config_file(&mut settings).unwrap();

    assert!(!settings.display.scale_to_fit);
    assert_eq!(
        settings.files.last_directory,
        std::path::PathBuf::from("/home/x/roms")
    );
    assert_eq!(settings.pads[0][0], Binding::key(KeyCode::KeyI));
    assert!(matches!(
        settings.pads[0][1],
        Binding::Key {
            key: KeyCode::KeyK,
            ..
        }
    ));
    assert_eq!(settings.pads[0][2], Binding::None);
}

#[test]
fn test_loaded_settings_drive_input() {
    let (_dir, store) = store_with(
        r#"
[Input]
ControllerPort1 = "superscope"

[Shortcuts]
Pause = "Keyboard KeyP"
"#,
    );

    let mut settings = Settings::default();
    store.load_config_file(&mut settings).unwrap();

    let mut controls = ControlMap::new();
    ConfigStore::rebind_keys(&settings, &mut controls);
    assert!(matches!(
        controls.button(&Binding::key(KeyCode::KeyP)),
        Some(Command::Shortcut(_))
    ));
    assert!(matches!(
        controls.button(&Binding::key(KeyCode::ArrowUp)),
        Some(Command::Joypad { pad: 1, .. })
    ));

    let mut ports = ControllerPorts::new();
    ConfigStore::apply_controller_ports(&settings, &mut ports);

    let mut captured = Settings::default();
    ConfigStore::capture_controller_ports(&mut captured, &ports);
    assert_eq!(captured.input.ports[0], ControllerType::Joypad);
    assert_eq!(captured.input.ports[1], ControllerType::SuperScope);
}
