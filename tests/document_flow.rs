use sprig::app::App;
use sprig::event::{Key, MouseButton};
use sprig::geometry::Rect;
use sprig::input::{Outcome, RawInput};
use sprig::parser::{self, LoadError};
use sprig::sandbox::MAX_FILE_SIZE_BYTES;
use sprig::style::DEFAULT_FONT;
use std::fs;

const FORM: &str = r##"<?xml version="1.0"?>
<window name="Form" width="240" height="160" style="background-color: #202020">
    <input id="name" height="30" value="ab" style="border-color: #ff0000"/>
    <button id="go" height="30" style="background-color: #0000ff; hover-color: #00ff00">Go</button>
</window>"##;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn load_edit_render_and_export() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("form.xml");
    fs::write(&path, FORM).expect("write document");

    let doc = parser::load(&path, DEFAULT_FONT).expect("load");
    let field = doc.find_by_id("name").expect("input");
    let button = doc.find_by_id("go").expect("button");
    let button_box = doc.node(button).frame.bounds();
    assert_eq!(button_box, Rect::new(10, 50, 220, 30));

    let mut app = App::new(doc, 240, 160);
    assert_eq!(app.tick().dirty, Some(Rect::new(0, 0, 240, 160)));

    // focus the input and edit it
    app.dispatch(RawInput::CursorMoved { x: 20.0, y: 20.0 });
    app.dispatch(RawInput::Button { button: Some(MouseButton::Left), pressed: true });
    app.dispatch(RawInput::Button { button: Some(MouseButton::Left), pressed: false });
    app.dispatch(RawInput::Key { key: Some(Key::Backspace), pressed: true });
    app.dispatch(RawInput::Key { key: Some(Key::Backspace), pressed: false });
    app.dispatch(RawInput::Character('z'));
    assert_eq!(app.drain().outcome, Outcome::Continue);
    assert_eq!(app.input().active, Some(field));
    assert_eq!(app.document().node(field).value_string(), "az");

    // hovering the button repaints it
    app.dispatch(RawInput::CursorMoved { x: 100.0, y: 60.0 });
    let dirty = app.tick().dirty.expect("hover repaints");
    // the caret of the input goes away too, since the pointer left it
    assert_eq!(dirty.intersect(&button_box), Some(button_box));
    assert_eq!(app.canvas().pixel(100, 60), Some(0x00FF00));

    let out = dir.path().join("frame.png");
    app.canvas().save_png(&out).expect("save png");
    assert!(fs::metadata(&out).expect("png written").len() > 0);

    app.dispatch(RawInput::CloseRequested);
    assert_eq!(app.tick().outcome, Outcome::Close);
}

#[test]
fn loader_rejects_bad_inputs() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");

    let huge = dir.path().join("huge.xml");
    fs::write(&huge, " ".repeat(MAX_FILE_SIZE_BYTES + 1)).expect("write");
    assert!(matches!(parser::load(&huge, DEFAULT_FONT), Err(LoadError::Sandbox(_))));

    let broken = dir.path().join("broken.xml");
    fs::write(&broken, "<window>\n  <input>\n</window>").expect("write");
    match parser::load(&broken, DEFAULT_FONT) {
        Err(LoadError::Parse(_, e)) => assert_eq!(e.line, 3),
        other => panic!("expected parse error, got {:?}", other.map(|d| d.len())),
    }

    let missing = dir.path().join("missing.xml");
    assert!(matches!(parser::load(&missing, DEFAULT_FONT), Err(LoadError::Io(..))));
}

#[test]
fn any_readable_path_loads() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("forms")).expect("mkdir");
    fs::create_dir(dir.path().join("sub")).expect("mkdir");
    fs::write(dir.path().join("forms").join("my..form.ui"), FORM).expect("write");

    let path = dir.path().join("sub").join("..").join("forms").join("my..form.ui");
    let doc = parser::load(&path, DEFAULT_FONT).expect("load");
    assert!(doc.find_by_id("go").is_some());
}

#[test]
fn demo_document_parses() {
    let source = include_str!("../demos/hello.xml");
    let doc = parser::parse(source).expect("demo parses");
    let win = doc.window().expect("window");
    assert_eq!(doc.node(win).name, "Hello");
    assert!(doc.find_by_id("user").is_some());
}
