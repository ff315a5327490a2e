//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL
//! shaders, and the [`ShaderProgramBuilder`] that compiles a set of stages and links them.
//! Both handle types release their driver object when dropped.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::abs::GlApi;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The `GL_*_SHADER` enum for this stage.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors produced while building a shader program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("could not create {stage} shader object: {reason}")]
    ShaderCreation { stage: ShaderStage, reason: String },
    #[error("{stage} shader failed to compile{}", log_suffix(.log))]
    Compile { stage: ShaderStage, log: String },
    #[error("could not create program object: {0}")]
    ProgramCreation(String),
    #[error("program failed to link{}", log_suffix(.log))]
    Link { log: String },
}

impl ProgramError {
    /// The stage at fault, if the failure happened before linking.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            ProgramError::ShaderCreation { stage, .. } | ProgramError::Compile { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}

fn log_suffix(log: &str) -> String {
    if log.is_empty() {
        String::new()
    } else {
        format!(": {log}")
    }
}

/// Drivers pad info logs with NULs and newlines; an all-padding log counts as no log.
fn info_log(raw: String) -> String {
    raw.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// A vertex and fragment source pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    vertex: String,
    fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Position passthrough and a flat red fragment.
    pub fn triangle() -> Self {
        Self::new(
            include_str!("../render/shaders/triangle/vert.glsl"),
            include_str!("../render/shaders/triangle/frag.glsl"),
        )
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader<G: GlApi> {
    gl: Arc<G>,
    id: G::Shader,
    stage: ShaderStage,
}

impl<G: GlApi> Shader<G> {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the shader object is deleted before the error is returned.
    pub fn new(gl: &Arc<G>, stage: ShaderStage, source: &str) -> Result<Self, ProgramError> {
        let shader = gl
            .create_shader(stage)
            .map_err(|reason| ProgramError::ShaderCreation { stage, reason })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = info_log(gl.shader_info_log(shader));
            gl.delete_shader(shader);
            return Err(ProgramError::Compile { stage, log });
        }

        Ok(Self {
            gl: Arc::clone(gl),
            id: shader,
            stage,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: GlApi> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram<G: GlApi> {
    gl: Arc<G>,
    id: G::Program,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Links a new shader program from the given shaders.
    ///
    /// `attributes` are bound to their locations before linking.
    pub fn new(
        gl: &Arc<G>,
        shaders: &[&Shader<G>],
        attributes: &[(u32, &str)],
    ) -> Result<Self, ProgramError> {
        let program = gl.create_program().map_err(ProgramError::ProgramCreation)?;

        for shader in shaders {
            gl.attach_shader(program, shader.id);
        }
        for (index, name) in attributes {
            gl.bind_attrib_location(program, *index, name);
        }

        gl.link_program(program);

        if !gl.program_link_status(program) {
            let log = info_log(gl.program_info_log(program));
            gl.delete_program(program);
            return Err(ProgramError::Link { log });
        }

        for shader in shaders {
            gl.detach_shader(program, shader.id);
        }

        Ok(Self {
            gl: Arc::clone(gl),
            id: program,
        })
    }

    /// Compiles and links a vertex/fragment pair, binding `vPosition` to location 0.
    pub fn from_source(gl: &Arc<G>, source: &ShaderSource) -> Result<Self, ProgramError> {
        ShaderProgramBuilder::new(gl)
            .vertex(source.vertex())
            .fragment(source.fragment())
            .bind_attribute(0, "vPosition")
            .build()
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.id));
    }

    pub fn id(&self) -> G::Program {
        self.id
    }
}

impl<G: GlApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

/// Collects shader stages and attribute bindings, then compiles and links them.
pub struct ShaderProgramBuilder<'a, G: GlApi> {
    gl: Arc<G>,
    stages: Vec<(ShaderStage, &'a str)>,
    attributes: Vec<(u32, &'a str)>,
}

impl<'a, G: GlApi> ShaderProgramBuilder<'a, G> {
    pub fn new(gl: &Arc<G>) -> Self {
        Self {
            gl: Arc::clone(gl),
            stages: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: ShaderStage, source: &'a str) -> Self {
        self.stages.push((stage, source));
        self
    }

    pub fn vertex(self, source: &'a str) -> Self {
        self.stage(ShaderStage::Vertex, source)
    }

    pub fn fragment(self, source: &'a str) -> Self {
        self.stage(ShaderStage::Fragment, source)
    }

    pub fn bind_attribute(mut self, index: u32, name: &'a str) -> Self {
        self.attributes.push((index, name));
        self
    }

    /// Compiles every stage in the order given, then links.
    ///
    /// The first stage that fails stops the build; stages already compiled are released.
    /// Compiled shaders are released once linking finishes, whatever its outcome.
    pub fn build(self) -> Result<ShaderProgram<G>, ProgramError> {
        let mut shaders = Vec::with_capacity(self.stages.len());
        for (stage, source) in &self.stages {
            shaders.push(Shader::new(&self.gl, *stage, source)?);
        }

        let refs: Vec<&Shader<G>> = shaders.iter().collect();
        ShaderProgram::new(&self.gl, &refs, &self.attributes)
    }
}
