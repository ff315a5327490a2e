//! A recording GL driver for tests.
//!
//! [`FakeGl`] keeps just enough driver state to behave like a GLES 2.0 implementation for
//! the calls in [`GlApi`]: shaders "compile" when their braces balance and they define
//! `main`, programs "link" when every fragment `varying` matches a vertex `varying` of the
//! same type. Deleting or using an object that is not alive panics, so double frees and
//! use-after-release show up as test failures.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::abs::{GlApi, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram,
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    BindAttribLocation { program: u32, index: u32, name: String },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateBuffer,
    BindArrayBuffer(Option<u32>),
    ArrayBufferData(Vec<f32>),
    DeleteBuffer(u32),
    VertexAttribPointer { index: u32, components: i32, stride: i32, offset: i32 },
    EnableVertexAttribArray(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    DrawTriangles { first: i32, count: i32 },
}

struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

#[derive(Default)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    buffers: HashSet<u32>,
    deny_shader: Option<ShaderStage>,
    deny_program: bool,
    deny_buffer: bool,
    errors: Vec<u32>,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeGl {
    state: RefCell<State>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_shader` fail for the given stage.
    pub fn deny_shader(&self, stage: ShaderStage) {
        self.state.borrow_mut().deny_shader = Some(stage);
    }

    /// Makes `create_program` fail.
    pub fn deny_program(&self) {
        self.state.borrow_mut().deny_program = true;
    }

    /// Makes `create_buffer` fail.
    pub fn deny_buffer(&self) {
        self.state.borrow_mut().deny_buffer = true;
    }

    /// Queues an error code for the next `error()` calls.
    pub fn raise(&self, code: u32) {
        self.state.borrow_mut().errors.push(code);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draws(&self) -> Vec<(i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<(i32, i32, i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Viewport(x, y, w, h) => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_colors(&self) -> Vec<[f32; 4]> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::ClearColor(rgba) => Some(*rgba),
                _ => None,
            })
            .collect()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn balanced(source: &str) -> bool {
    let mut depth = 0i32;
    for c in source.chars() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

fn varyings(source: &str) -> HashMap<String, String> {
    source
        .lines()
        .filter_map(|line| {
            let mut words = line.trim().trim_end_matches(';').split_whitespace();
            match (words.next(), words.next(), words.next()) {
                (Some("varying"), Some(ty), Some(name)) => Some((name.to_string(), ty.to_string())),
                _ => None,
            }
        })
        .collect()
}

impl GlApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        self.record(Call::CreateShader(stage));
        let mut state = self.state.borrow_mut();
        if state.deny_shader == Some(stage) {
            return Err("out of shader objects".to_string());
        }
        let id = state.next();
        state.shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        let s = state.shaders.get_mut(&shader).expect("shader_source on dead shader");
        s.source = source.to_string();
    }

    fn compile_shader(&self, shader: u32) {
        self.record(Call::CompileShader(shader));
        let mut state = self.state.borrow_mut();
        let s = state.shaders.get_mut(&shader).expect("compile_shader on dead shader");
        s.compiled = s.source.contains("void main") && balanced(&s.source);
        s.log = if s.compiled {
            String::new()
        } else {
            "0:1: error: syntax error\0".to_string()
        };
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders[&shader].compiled
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state.borrow().shaders[&shader].log.clone()
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
        assert!(
            self.state.borrow_mut().shaders.remove(&shader).is_some(),
            "double delete of shader {shader}"
        );
    }

    fn create_program(&self) -> Result<u32, String> {
        self.record(Call::CreateProgram);
        let mut state = self.state.borrow_mut();
        if state.deny_program {
            return Err("out of program objects".to_string());
        }
        let id = state.next();
        state.programs.insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader { program, shader });
        let mut state = self.state.borrow_mut();
        assert!(state.shaders.contains_key(&shader), "attach of dead shader");
        state
            .programs
            .get_mut(&program)
            .expect("attach to dead program")
            .attached
            .push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(Call::DetachShader { program, shader });
        let mut state = self.state.borrow_mut();
        let p = state.programs.get_mut(&program).expect("detach from dead program");
        p.attached.retain(|s| *s != shader);
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        self.record(Call::BindAttribLocation {
            program,
            index,
            name: name.to_string(),
        });
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
        let mut state = self.state.borrow_mut();
        let attached = state.programs[&program].attached.clone();
        let mut vertex = HashMap::new();
        let mut fragment = HashMap::new();
        let mut log = String::new();
        for id in &attached {
            let shader = &state.shaders[id];
            if !shader.compiled {
                log = format!("shader {id} is not compiled");
            }
            match shader.stage {
                ShaderStage::Vertex => vertex.extend(varyings(&shader.source)),
                ShaderStage::Fragment => fragment.extend(varyings(&shader.source)),
            }
        }
        for (name, ty) in &fragment {
            match vertex.get(name) {
                Some(vty) if vty == ty => {}
                Some(vty) => {
                    log = format!("varying `{name}` declared {vty} in vertex, {ty} in fragment")
                }
                None => log = format!("varying `{name}` not written by vertex shader"),
            }
        }
        let p = state.programs.get_mut(&program).expect("link of dead program");
        p.linked = log.is_empty();
        p.log = log;
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs[&program].linked
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state.borrow().programs[&program].log.clone()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
        if let Some(id) = program {
            let state = self.state.borrow();
            let p = state.programs.get(&id).expect("use of released program");
            assert!(p.linked, "use of unlinked program");
        }
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
        assert!(
            self.state.borrow_mut().programs.remove(&program).is_some(),
            "double delete of program {program}"
        );
    }

    fn create_buffer(&self) -> Result<u32, String> {
        self.record(Call::CreateBuffer);
        let mut state = self.state.borrow_mut();
        if state.deny_buffer {
            return Err("out of buffer objects".to_string());
        }
        let id = state.next();
        state.buffers.insert(id);
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer(buffer));
        if let Some(id) = buffer {
            assert!(self.state.borrow().buffers.contains(&id), "bind of released buffer");
        }
    }

    fn array_buffer_data(&self, data: &[f32]) {
        self.record(Call::ArrayBufferData(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(Call::DeleteBuffer(buffer));
        assert!(
            self.state.borrow_mut().buffers.remove(&buffer),
            "double delete of buffer {buffer}"
        );
    }

    fn vertex_attrib_pointer(&self, index: u32, components: i32, stride: i32, offset: i32) {
        self.record(Call::VertexAttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear_color_buffer(&self) {
        self.record(Call::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles { first, count });
    }

    fn error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            0
        } else {
            state.errors.remove(0)
        }
    }
}
