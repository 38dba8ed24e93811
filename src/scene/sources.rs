//! GLSL embedded in the binaries for the scenes that don't load from disk.

pub const POSITION_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;

void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
"#;

pub const ORANGE_FRAGMENT: &str = r#"
#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
"#;

pub const UNIFORM_COLOR_FRAGMENT: &str = r#"
#version 330 core
out vec4 FragColor;
uniform vec4 ourColor;

void main()
{
    FragColor = ourColor;
}
"#;
