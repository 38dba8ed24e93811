use glyphwork::{app, SceneKind};

fn main() -> anyhow::Result<()> {
    app::run(SceneKind::TexturedQuad)
}
