//! Abstract interpretation of method bodies. The engine simulates the
//! operand stack and local variables over a small value lattice, visits
//! basic blocks to a fixpoint, and projects every reachable return
//! instruction to an [`HttpResponse`].

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use apimap_classfile::{
    decode, internal_to_binary, parse_method_descriptor, ClassFile, Insn, IntArith, JavaType,
    MemberRef, Method, MethodType, VarKind,
};
use apimap_classpool::ClassPool;
use apimap_model::{CallTarget, HttpResponse, MethodKey, STATUS_UNKNOWN};
use tracing::{debug, warn};

use crate::vocab;

/// Fixpoint iteration cap per basic block; beyond it the block's state is
/// widened to `Unknown` and the overrun is reported once per method.
pub const DEFAULT_ITERATION_CAP: u32 = 50;

const MAX_CALL_DEPTH: u32 = 8;

pub(crate) struct InterpContext<'a> {
    pub pool: &'a ClassPool,
    pub iteration_cap: u32,
}

pub(crate) struct MethodOutcome {
    pub responses: Vec<HttpResponse>,
    /// Project-local call targets observed in the body.
    pub invoked: Vec<CallTarget>,
}

/// Entry point: infer the response set of one method.
pub(crate) fn interpret_method(
    ctx: &InterpContext<'_>,
    class: &ClassFile,
    method: &Method,
) -> MethodOutcome {
    let mut calls = CallState::default();
    let mut responses = run(ctx, &mut calls, class, method);
    responses.sort();
    responses.dedup();
    MethodOutcome {
        responses,
        invoked: calls.invoked,
    }
}

#[derive(Default)]
struct CallState {
    /// Methods currently being interpreted, for cycle detection.
    active: HashSet<(String, String, String)>,
    depth: u32,
    invoked: Vec<CallTarget>,
}

/// Builder state under construction: the response fields accumulated by a
/// `Response.status(..).header(..)...` chain.
#[derive(Clone, Debug, Default, PartialEq)]
struct BuilderState {
    statuses: BTreeSet<u16>,
    headers: BTreeSet<String>,
    cookies: BTreeSet<String>,
    entity: Option<String>,
}

impl BuilderState {
    fn with_status(status: u16) -> Self {
        Self {
            statuses: BTreeSet::from([status]),
            ..Self::default()
        }
    }

    fn merge(&mut self, other: &BuilderState) {
        self.statuses.extend(other.statuses.iter().copied());
        self.headers.extend(other.headers.iter().cloned());
        self.cookies.extend(other.cookies.iter().cloned());
        if self.entity.is_none() {
            self.entity = other.entity.clone();
        }
    }

    fn into_response(self) -> HttpResponse {
        HttpResponse {
            statuses: self.statuses,
            headers: self.headers,
            cookies: self.cookies,
            entity_type: self.entity,
        }
    }
}

/// Abstract value on the operand stack or in a local slot.
#[derive(Clone, Debug)]
enum Value {
    Unknown,
    Null,
    /// Scalar of known kind, unknown value.
    Prim(VarKind),
    /// Known integer literal.
    Int(i32),
    /// Known string literal.
    Str(String),
    /// Object reference of known static type (internal name).
    Type(String),
    /// A `Response.Status` enum constant with its numeric code.
    StatusConst(u16),
    Builder(BuilderState),
    /// A finalized response value; possibly several shapes when
    /// substituted from a callee.
    Response(Vec<HttpResponse>),
    /// A `NewCookie` instance whose name may be known.
    Cookie(Option<String>),
    /// A captured method reference awaiting its functional-interface call.
    Handle(MemberRef),
    /// Array whose stored elements are tracked by identity, so aliases
    /// created by `dup` observe later stores.
    Array(Rc<RefCell<Vec<Value>>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unknown, Value::Unknown) | (Value::Null, Value::Null) => true,
            (Value::Prim(a), Value::Prim(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::StatusConst(a), Value::StatusConst(b)) => a == b,
            (Value::Builder(a), Value::Builder(b)) => a == b,
            (Value::Response(a), Value::Response(b)) => a == b,
            (Value::Cookie(a), Value::Cookie(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl Value {
    fn of_type(ty: &JavaType) -> Value {
        match ty {
            JavaType::Boolean
            | JavaType::Byte
            | JavaType::Char
            | JavaType::Short
            | JavaType::Int => Value::Prim(VarKind::Int),
            JavaType::Long => Value::Prim(VarKind::Long),
            JavaType::Float => Value::Prim(VarKind::Float),
            JavaType::Double => Value::Prim(VarKind::Double),
            JavaType::Object(name) => Value::Type(name.clone()),
            JavaType::Array(_) => Value::Unknown,
        }
    }

    fn is_wide(&self) -> bool {
        matches!(self, Value::Prim(kind) if kind.is_wide())
    }

    /// Least upper bound at a control-flow merge.
    fn join(&self, other: &Value) -> Value {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Value::Builder(a), Value::Builder(b)) => {
                let mut merged = a.clone();
                merged.merge(b);
                Value::Builder(merged)
            }
            (Value::Response(a), Value::Response(b)) => {
                let mut merged = a.clone();
                for response in b {
                    if !merged.contains(response) {
                        merged.push(response.clone());
                    }
                }
                Value::Response(merged)
            }
            (Value::Int(_), Value::Int(_))
            | (Value::Int(_), Value::Prim(VarKind::Int))
            | (Value::Prim(VarKind::Int), Value::Int(_)) => Value::Prim(VarKind::Int),
            (Value::Str(_), Value::Str(_)) => Value::Type("java/lang/String".to_string()),
            (Value::Null, Value::Type(t)) | (Value::Type(t), Value::Null) => {
                Value::Type(t.clone())
            }
            _ => Value::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Frame {
    locals: Vec<Value>,
    stack: Vec<Value>,
}

impl Frame {
    fn join_from(&mut self, other: &Frame) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.locals.iter_mut().zip(other.locals.iter()) {
            let joined = mine.join(theirs);
            if *mine != joined {
                *mine = joined;
                changed = true;
            }
        }
        if self.stack.len() == other.stack.len() {
            for (mine, theirs) in self.stack.iter_mut().zip(other.stack.iter()) {
                let joined = mine.join(theirs);
                if *mine != joined {
                    *mine = joined;
                    changed = true;
                }
            }
        } else if !self.stack.iter().all(|v| matches!(v, Value::Unknown)) {
            // Stack depths only disagree on malformed code; widen rather
            // than guess.
            for value in &mut self.stack {
                *value = Value::Unknown;
            }
            changed = true;
        }
        changed
    }
}

/// Interpret one method body, returning the raw (unsorted) response set.
/// Methods without code (abstract, interface, native) fall back to a
/// response synthesized from the declared return type.
fn run(
    ctx: &InterpContext<'_>,
    calls: &mut CallState,
    class: &ClassFile,
    method: &Method,
) -> Vec<HttpResponse> {
    let descriptor = match parse_method_descriptor(&method.descriptor) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            warn!(method = %method.name, %err, "bad method descriptor, skipping body");
            return Vec::new();
        }
    };

    let Some(code) = &method.code else {
        return declared_response(&descriptor);
    };

    let insns = match decode(&code.bytes) {
        Ok(insns) => insns,
        Err(err) => {
            warn!(class = %class.name, method = %method.name, %err, "undecodable bytecode, using declared return type");
            return declared_response(&descriptor);
        }
    };
    if insns
        .iter()
        .any(|(_, insn)| matches!(insn, Insn::Jsr(_) | Insn::Ret))
    {
        warn!(class = %class.name, method = %method.name, "jsr/ret subroutines are not modeled, using declared return type");
        return declared_response(&descriptor);
    }
    if insns.is_empty() {
        return declared_response(&descriptor);
    }

    let blocks = BlockMap::build(&insns);
    let is_static = method.access_flags & apimap_classfile::ACC_STATIC != 0;
    let entry = entry_frame(class, &descriptor, code.max_locals as usize, is_static);

    let mut engine = Engine {
        ctx,
        calls,
        class,
        ret: descriptor.ret.clone(),
        responses: Vec::new(),
        limit_reported: false,
    };

    let mut in_frames: Vec<Option<Frame>> = vec![None; blocks.starts.len()];
    let mut visits: Vec<u32> = vec![0; blocks.starts.len()];
    let mut worklist: VecDeque<usize> = VecDeque::new();
    in_frames[0] = Some(entry);
    worklist.push_back(0);

    while let Some(block) = worklist.pop_front() {
        visits[block] += 1;
        if visits[block] > ctx.iteration_cap {
            if !engine.limit_reported {
                warn!(
                    class = %class.name,
                    method = %method.name,
                    cap = ctx.iteration_cap,
                    "fixpoint iteration cap exceeded, widening to unknown"
                );
                engine.limit_reported = true;
            }
            if let Some(frame) = &mut in_frames[block] {
                for value in frame.locals.iter_mut().chain(frame.stack.iter_mut()) {
                    *value = Value::Unknown;
                }
            }
        }

        let Some(mut frame) = in_frames[block].clone() else {
            continue;
        };

        let (first, last) = blocks.range(block);
        let mut fell_off = true;
        for index in first..=last {
            let insn = &insns[index].1;
            match engine.step(&mut frame, insn) {
                Flow::Next => {}
                Flow::Stop => {
                    fell_off = false;
                    break;
                }
            }
        }

        if fell_off {
            for succ_pc in blocks.successors(&insns, last) {
                let Some(succ) = blocks.block_at(succ_pc) else {
                    continue;
                };
                let changed = match &mut in_frames[succ] {
                    Some(existing) => existing.join_from(&frame),
                    slot @ None => {
                        *slot = Some(frame.clone());
                        true
                    }
                };
                if changed && !worklist.contains(&succ) {
                    worklist.push_back(succ);
                }
            }
        }
    }

    engine.responses
}

/// Response for a body the engine cannot (or need not) look into, derived
/// from the declared return type alone.
fn declared_response(descriptor: &MethodType) -> Vec<HttpResponse> {
    match &descriptor.ret {
        None => vec![HttpResponse::with_status(204)],
        Some(ty) => {
            if matches!(ty, JavaType::Object(name) if vocab::is_response_class(name)) {
                vec![HttpResponse::with_status(200)]
            } else {
                vec![HttpResponse {
                    entity_type: Some(ty.display_name()),
                    ..HttpResponse::with_status(200)
                }]
            }
        }
    }
}

fn entry_frame(
    class: &ClassFile,
    descriptor: &MethodType,
    max_locals: usize,
    is_static: bool,
) -> Frame {
    let mut locals = vec![Value::Unknown; max_locals];
    let mut slot = 0usize;
    if !is_static {
        if let Some(local) = locals.get_mut(slot) {
            *local = Value::Type(class.name.clone());
        }
        slot += 1;
    }
    for param in &descriptor.params {
        if let Some(local) = locals.get_mut(slot) {
            *local = Value::of_type(param);
        }
        slot += param.slots();
    }
    Frame {
        locals,
        stack: Vec::new(),
    }
}

struct BlockMap {
    /// Sorted pcs of block leaders.
    starts: Vec<u32>,
    /// pc → instruction index.
    index_of: HashMap<u32, usize>,
    /// block id → index of its last instruction.
    ends: Vec<usize>,
}

impl BlockMap {
    fn build(insns: &[(u32, Insn)]) -> Self {
        let index_of: HashMap<u32, usize> =
            insns.iter().enumerate().map(|(i, (pc, _))| (*pc, i)).collect();

        let mut leaders: BTreeSet<u32> = BTreeSet::from([insns[0].0]);
        for (i, (_, insn)) in insns.iter().enumerate() {
            let ends_block = match insn {
                Insn::If1(t) | Insn::If2(t) | Insn::Goto(t) => {
                    leaders.insert(*t);
                    true
                }
                Insn::TableSwitch { default, targets }
                | Insn::LookupSwitch { default, targets } => {
                    leaders.insert(*default);
                    leaders.extend(targets.iter().copied());
                    true
                }
                Insn::Return(_) | Insn::AThrow => true,
                _ => false,
            };
            if ends_block {
                if let Some((pc, _)) = insns.get(i + 1) {
                    leaders.insert(*pc);
                }
            }
        }

        let starts: Vec<u32> = leaders.into_iter().filter(|pc| index_of.contains_key(pc)).collect();
        let mut ends = Vec::with_capacity(starts.len());
        for (block, start_pc) in starts.iter().enumerate() {
            let first = index_of[start_pc];
            let last = match starts.get(block + 1) {
                Some(next_pc) => index_of[next_pc] - 1,
                None => insns.len() - 1,
            };
            debug_assert!(last >= first);
            ends.push(last);
        }
        Self {
            starts,
            index_of,
            ends,
        }
    }

    fn range(&self, block: usize) -> (usize, usize) {
        (self.index_of[&self.starts[block]], self.ends[block])
    }

    fn block_at(&self, pc: u32) -> Option<usize> {
        self.starts.binary_search(&pc).ok()
    }

    fn successors(&self, insns: &[(u32, Insn)], last: usize) -> Vec<u32> {
        let fallthrough = insns.get(last + 1).map(|(pc, _)| *pc);
        match &insns[last].1 {
            Insn::Return(_) | Insn::AThrow => Vec::new(),
            Insn::Goto(t) => vec![*t],
            Insn::If1(t) | Insn::If2(t) => {
                let mut succ = vec![*t];
                succ.extend(fallthrough);
                succ
            }
            Insn::TableSwitch { default, targets }
            | Insn::LookupSwitch { default, targets } => {
                let mut succ = vec![*default];
                succ.extend(targets.iter().copied());
                succ
            }
            _ => fallthrough.into_iter().collect(),
        }
    }
}

enum Flow {
    Next,
    /// Block execution ends here (return or throw).
    Stop,
}

struct Engine<'a, 'c> {
    ctx: &'a InterpContext<'a>,
    calls: &'c mut CallState,
    class: &'a ClassFile,
    ret: Option<JavaType>,
    responses: Vec<HttpResponse>,
    limit_reported: bool,
}

impl Engine<'_, '_> {
    fn step(&mut self, frame: &mut Frame, insn: &Insn) -> Flow {
        let cp = &self.class.constant_pool;
        match insn {
            Insn::Nop | Insn::Iinc(_) => {
                if let Insn::Iinc(index) = insn {
                    if let Some(local) = frame.locals.get_mut(*index as usize) {
                        *local = Value::Prim(VarKind::Int);
                    }
                }
            }
            Insn::ConstNull => frame.stack.push(Value::Null),
            Insn::ConstI(v) => frame.stack.push(Value::Int(*v)),
            Insn::ConstJ(_) => frame.stack.push(Value::Prim(VarKind::Long)),
            Insn::ConstF(_) => frame.stack.push(Value::Prim(VarKind::Float)),
            Insn::ConstD(_) => frame.stack.push(Value::Prim(VarKind::Double)),
            Insn::Ldc(index) => {
                let value = match cp.get(*index) {
                    Ok(apimap_classfile::Const::Int(v)) => Value::Int(*v),
                    Ok(apimap_classfile::Const::Float(_)) => Value::Prim(VarKind::Float),
                    Ok(apimap_classfile::Const::Str { .. }) => cp
                        .string(*index)
                        .map(|s| Value::Str(s.to_string()))
                        .unwrap_or(Value::Unknown),
                    Ok(apimap_classfile::Const::Class { .. }) => {
                        Value::Type("java/lang/Class".to_string())
                    }
                    _ => Value::Unknown,
                };
                frame.stack.push(value);
            }
            Insn::Ldc2(index) => {
                let kind = match cp.get(*index) {
                    Ok(apimap_classfile::Const::Double(_)) => VarKind::Double,
                    _ => VarKind::Long,
                };
                frame.stack.push(Value::Prim(kind));
            }
            Insn::Load(_, slot) => {
                let value = frame
                    .locals
                    .get(*slot as usize)
                    .cloned()
                    .unwrap_or(Value::Unknown);
                frame.stack.push(value);
            }
            Insn::Store(_, slot) => {
                let value = self.pop(frame);
                if let Some(local) = frame.locals.get_mut(*slot as usize) {
                    *local = value;
                }
            }
            Insn::ArrayLoad(kind) => {
                self.pop(frame);
                self.pop(frame);
                frame.stack.push(match kind {
                    VarKind::Ref => Value::Unknown,
                    kind => Value::Prim(*kind),
                });
            }
            Insn::ArrayStore => {
                let value = self.pop(frame);
                self.pop(frame); // index
                let array = self.pop(frame);
                if let Value::Array(contents) = array {
                    contents.borrow_mut().push(value);
                }
            }
            Insn::Pop => {
                self.pop(frame);
            }
            Insn::Pop2 => {
                let top = self.pop(frame);
                if !top.is_wide() {
                    self.pop(frame);
                }
            }
            Insn::Dup => {
                let top = self.top(frame);
                frame.stack.push(top);
            }
            Insn::DupX1 => {
                let a = self.pop(frame);
                let b = self.pop(frame);
                frame.stack.push(a.clone());
                frame.stack.push(b);
                frame.stack.push(a);
            }
            Insn::DupX2 => {
                let a = self.pop(frame);
                let b = self.pop(frame);
                if b.is_wide() {
                    frame.stack.push(a.clone());
                    frame.stack.push(b);
                } else {
                    let c = self.pop(frame);
                    frame.stack.push(a.clone());
                    frame.stack.push(c);
                    frame.stack.push(b);
                }
                frame.stack.push(a);
            }
            Insn::Dup2 => {
                let a = self.top(frame);
                if a.is_wide() {
                    frame.stack.push(a);
                } else {
                    let len = frame.stack.len();
                    let b = frame
                        .stack
                        .get(len.wrapping_sub(2))
                        .cloned()
                        .unwrap_or(Value::Unknown);
                    frame.stack.push(b);
                    frame.stack.push(a);
                }
            }
            Insn::Dup2X1 | Insn::Dup2X2 => {
                // Rare in compiler output; approximate by keeping the top
                // pair and widening the disturbed slots.
                let a = self.pop(frame);
                if a.is_wide() {
                    let b = self.pop(frame);
                    frame.stack.push(a.clone());
                    frame.stack.push(b);
                    frame.stack.push(a);
                } else {
                    let b = self.pop(frame);
                    let c = self.pop(frame);
                    frame.stack.push(b.clone());
                    frame.stack.push(a.clone());
                    frame.stack.push(c);
                    frame.stack.push(b);
                    frame.stack.push(a);
                }
            }
            Insn::Swap => {
                let a = self.pop(frame);
                let b = self.pop(frame);
                frame.stack.push(a);
                frame.stack.push(b);
            }
            Insn::IntArith(op) => {
                let rhs = self.pop(frame);
                let lhs = self.pop(frame);
                frame.stack.push(fold_int(op, &lhs, &rhs));
            }
            Insn::Arith2(kind) => {
                self.pop(frame);
                self.pop(frame);
                frame.stack.push(Value::Prim(*kind));
            }
            Insn::Neg(kind) => {
                let value = self.pop(frame);
                frame.stack.push(match (kind, value) {
                    (VarKind::Int, Value::Int(v)) => Value::Int(v.wrapping_neg()),
                    (kind, _) => Value::Prim(*kind),
                });
            }
            Insn::Convert(kind) => {
                let value = self.pop(frame);
                frame.stack.push(match (kind, value) {
                    (VarKind::Int, Value::Int(v)) => Value::Int(v),
                    (kind, _) => Value::Prim(*kind),
                });
            }
            Insn::Cmp => {
                self.pop(frame);
                self.pop(frame);
                frame.stack.push(Value::Prim(VarKind::Int));
            }
            Insn::If1(_) => {
                self.pop(frame);
            }
            Insn::If2(_) => {
                self.pop(frame);
                self.pop(frame);
            }
            Insn::Goto(_) => {}
            Insn::Jsr(_) | Insn::Ret => {
                // Rejected before interpretation starts.
            }
            Insn::TableSwitch { .. } | Insn::LookupSwitch { .. } => {
                self.pop(frame);
            }
            Insn::Return(kind) => {
                let value = kind.map(|_| self.pop(frame));
                self.project_return(value);
                return Flow::Stop;
            }
            Insn::GetStatic(index) => {
                let value = match cp.member_ref(*index) {
                    Ok(field) => {
                        if vocab::is_status_enum_class(&field.class) {
                            match vocab::status_enum_code(&field.name) {
                                Some(code) => Value::StatusConst(code),
                                None => Value::Type(field.class),
                            }
                        } else {
                            value_of_descriptor(&field.descriptor)
                        }
                    }
                    Err(_) => Value::Unknown,
                };
                frame.stack.push(value);
            }
            Insn::PutStatic(_) => {
                self.pop(frame);
            }
            Insn::GetField(index) => {
                self.pop(frame);
                let value = match cp.member_ref(*index) {
                    Ok(field) => value_of_descriptor(&field.descriptor),
                    Err(_) => Value::Unknown,
                };
                frame.stack.push(value);
            }
            Insn::PutField(_) => {
                self.pop(frame);
                self.pop(frame);
            }
            Insn::InvokeVirtual(index) | Insn::InvokeInterface(index) => {
                self.invoke(frame, *index, Receiver::Instance);
            }
            Insn::InvokeSpecial(index) => {
                self.invoke(frame, *index, Receiver::Special);
            }
            Insn::InvokeStatic(index) => {
                self.invoke(frame, *index, Receiver::None);
            }
            Insn::InvokeDynamic(index) => {
                self.invoke_dynamic(frame, *index);
            }
            Insn::New(index) => {
                let value = cp
                    .class_name(*index)
                    .map(|name| Value::Type(name.to_string()))
                    .unwrap_or(Value::Unknown);
                frame.stack.push(value);
            }
            Insn::NewPrimArray | Insn::NewRefArray(_) => {
                self.pop(frame);
                frame.stack.push(Value::Array(Rc::new(RefCell::new(Vec::new()))));
            }
            Insn::NewMultiArray(_, dims) => {
                for _ in 0..*dims {
                    self.pop(frame);
                }
                frame.stack.push(Value::Unknown);
            }
            Insn::ArrayLength => {
                self.pop(frame);
                frame.stack.push(Value::Prim(VarKind::Int));
            }
            Insn::AThrow => {
                self.pop(frame);
                return Flow::Stop;
            }
            Insn::CheckCast(index) => {
                let value = self.pop(frame);
                let replacement = match value {
                    Value::Unknown | Value::Null | Value::Type(_) => cp
                        .class_name(*index)
                        .map(|name| Value::Type(name.to_string()))
                        .unwrap_or(Value::Unknown),
                    other => other,
                };
                frame.stack.push(replacement);
            }
            Insn::InstanceOf(_) => {
                self.pop(frame);
                frame.stack.push(Value::Prim(VarKind::Int));
            }
            Insn::MonitorEnter | Insn::MonitorExit => {
                self.pop(frame);
            }
        }
        Flow::Next
    }

    fn pop(&mut self, frame: &mut Frame) -> Value {
        frame.stack.pop().unwrap_or(Value::Unknown)
    }

    fn top(&self, frame: &Frame) -> Value {
        frame.stack.last().cloned().unwrap_or(Value::Unknown)
    }

    fn project_return(&mut self, value: Option<Value>) {
        let response = match value {
            None => vec![HttpResponse::with_status(204)],
            Some(Value::Builder(state)) => vec![normalize(state.into_response())],
            Some(Value::Response(responses)) => {
                responses.into_iter().map(normalize).collect()
            }
            Some(other) => {
                let entity = match &other {
                    Value::Str(_) => Some("java.lang.String".to_string()),
                    Value::Int(_) => Some("int".to_string()),
                    Value::Prim(kind) => Some(prim_name(*kind).to_string()),
                    Value::Type(name) if !vocab::is_response_class(name) => {
                        Some(internal_to_binary(name))
                    }
                    Value::Type(_) => None,
                    _ => match &self.ret {
                        Some(JavaType::Object(name)) if vocab::is_response_class(name) => None,
                        Some(ty) => Some(ty.display_name()),
                        None => None,
                    },
                };
                vec![HttpResponse {
                    entity_type: entity,
                    ..HttpResponse::with_status(200)
                }]
            }
        };
        for r in response {
            if !self.responses.contains(&r) {
                self.responses.push(r);
            }
        }
    }

    fn invoke(&mut self, frame: &mut Frame, cp_index: u16, receiver_kind: Receiver) {
        let cp = &self.class.constant_pool;
        let Ok(mref) = cp.member_ref(cp_index) else {
            frame.stack.push(Value::Unknown);
            return;
        };
        let Ok(descriptor) = parse_method_descriptor(&mref.descriptor) else {
            debug!(member = %mref.name, "bad invoke descriptor");
            frame.stack.push(Value::Unknown);
            return;
        };

        let mut args: Vec<Value> = Vec::with_capacity(descriptor.params.len());
        for _ in 0..descriptor.params.len() {
            args.push(self.pop(frame));
        }
        args.reverse();
        let receiver = match receiver_kind {
            Receiver::None => None,
            Receiver::Instance | Receiver::Special => Some(self.pop(frame)),
        };

        // Constructors: the dup'ed alias left on the stack becomes the
        // constructed value (`new; dup; <args>; invokespecial` pattern).
        if matches!(receiver_kind, Receiver::Special) && mref.name == "<init>" {
            let constructed = if vocab::is_new_cookie_class(&mref.class) {
                let name = args.first().and_then(|v| match v {
                    Value::Str(s) => Some(s.clone()),
                    _ => None,
                });
                Value::Cookie(name)
            } else {
                Value::Type(mref.class.clone())
            };
            if let Some(top) = frame.stack.last_mut() {
                if matches!(&*top, Value::Type(t) if *t == mref.class) {
                    *top = constructed;
                }
            }
            return;
        }

        // Static factory methods on the framework Response class.
        if matches!(receiver_kind, Receiver::None) && vocab::is_response_class(&mref.class) {
            frame.stack.push(response_factory(&mref.name, &args, &descriptor));
            return;
        }

        // Builder chain operations dispatch on the receiver value.
        if let Some(Value::Builder(state)) = &receiver {
            let value = builder_op(state.clone(), &mref, &args, &descriptor);
            push_non_void(frame, Some(value), &descriptor);
            return;
        }

        // Functional-interface call through a captured method reference.
        if let Some(Value::Handle(target)) = &receiver {
            let target = target.clone();
            if let Some(responses) = self.callee_responses(&target) {
                if !responses.is_empty() {
                    push_non_void(frame, Some(Value::Response(responses)), &descriptor);
                    return;
                }
            }
            push_non_void(frame, None, &descriptor);
            return;
        }

        // Project-local call: remember the target for the job registry and
        // substitute its inferred responses when it returns the framework
        // response type.
        let binary = internal_to_binary(&mref.class);
        if self.ctx.pool.is_project_class(&binary) {
            let target = CallTarget {
                class: binary,
                method: MethodKey::new(&mref.name, &mref.descriptor),
            };
            if !self.calls.invoked.contains(&target) {
                self.calls.invoked.push(target);
            }
            if matches!(&descriptor.ret, Some(JavaType::Object(name)) if vocab::is_response_class(name))
            {
                if let Some(responses) = self.callee_responses(&mref) {
                    push_non_void(frame, Some(Value::Response(responses)), &descriptor);
                    return;
                }
            }
        }

        push_non_void(frame, None, &descriptor);
    }

    /// Interpret a callee and return its response set; `None` on cycles,
    /// unresolvable classes, or depth exhaustion.
    fn callee_responses(&mut self, mref: &MemberRef) -> Option<Vec<HttpResponse>> {
        let binary = internal_to_binary(&mref.class);
        let id = (binary.clone(), mref.name.clone(), mref.descriptor.clone());
        if self.calls.depth >= MAX_CALL_DEPTH || self.calls.active.contains(&id) {
            return None;
        }
        let bytes = match self.ctx.pool.read_class(&binary) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(class = %binary, %err, "call target not resolvable");
                return None;
            }
        };
        let parsed = match ClassFile::parse(&bytes) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(class = %binary, %err, "call target unparseable");
                return None;
            }
        };
        let method = parsed.method(&mref.name, &mref.descriptor)?.clone();

        self.calls.active.insert(id.clone());
        self.calls.depth += 1;
        let responses = run(self.ctx, self.calls, &parsed, &method);
        self.calls.depth -= 1;
        self.calls.active.remove(&id);
        Some(responses)
    }

    fn invoke_dynamic(&mut self, frame: &mut Frame, cp_index: u16) {
        let cp = &self.class.constant_pool;
        let Ok((bootstrap, _, site_descriptor)) = cp.invoke_dynamic(cp_index) else {
            frame.stack.push(Value::Unknown);
            return;
        };
        let site_descriptor = site_descriptor.to_string();
        let Ok(descriptor) = parse_method_descriptor(&site_descriptor) else {
            frame.stack.push(Value::Unknown);
            return;
        };
        for _ in 0..descriptor.params.len() {
            self.pop(frame);
        }

        // Lambda metafactories carry the implementation handle among their
        // static arguments; the first method handle found is the target.
        let handle = self
            .class
            .bootstrap_methods
            .get(bootstrap as usize)
            .and_then(|bm| {
                bm.arguments
                    .iter()
                    .find_map(|&arg| cp.method_handle(arg).ok())
            })
            .map(|(_, target)| target);

        match handle {
            Some(target) => frame.stack.push(Value::Handle(target)),
            None => push_non_void(frame, None, &descriptor),
        }
    }
}

/// Seed builder state from a `Response.<factory>(..)` call.
fn response_factory(name: &str, args: &[Value], descriptor: &MethodType) -> Value {
    let entity_from_first = |args: &[Value]| args.first().and_then(entity_of);
    let state = match name {
        "status" => BuilderState::with_status(status_of(args.first())),
        "ok" => BuilderState {
            entity: entity_from_first(args),
            ..BuilderState::with_status(200)
        },
        "accepted" => BuilderState {
            entity: entity_from_first(args),
            ..BuilderState::with_status(202)
        },
        "noContent" => BuilderState::with_status(204),
        "created" => BuilderState::with_status(201),
        "serverError" => BuilderState::with_status(500),
        "seeOther" => BuilderState::with_status(303),
        "temporaryRedirect" => BuilderState::with_status(307),
        "notAcceptable" => BuilderState::with_status(406),
        "fromResponse" => {
            let mut state = BuilderState::default();
            if let Some(Value::Response(responses)) = args.first() {
                for response in responses {
                    state.statuses.extend(response.statuses.iter().copied());
                    state.headers.extend(response.headers.iter().cloned());
                    state.cookies.extend(response.cookies.iter().cloned());
                    if state.entity.is_none() {
                        state.entity = response.entity_type.clone();
                    }
                }
            }
            state
        }
        _ => return value_of_return(&descriptor.ret),
    };
    Value::Builder(state)
}

/// Apply one operation of a builder chain.
fn builder_op(
    mut state: BuilderState,
    mref: &MemberRef,
    args: &[Value],
    descriptor: &MethodType,
) -> Value {
    match mref.name.as_str() {
        "status" => {
            state.statuses.insert(status_of(args.first()));
            Value::Builder(state)
        }
        "header" => {
            if let Some(Value::Str(name)) = args.first() {
                state.headers.insert(name.clone());
            }
            Value::Builder(state)
        }
        "cookie" => {
            collect_cookie_names(args, &mut state.cookies);
            Value::Builder(state)
        }
        "entity" => {
            state.entity = args.first().and_then(entity_of);
            Value::Builder(state)
        }
        "build" => Value::Response(vec![state.into_response()]),
        "clone" => Value::Builder(state),
        _ => {
            // Remaining builder methods (type, language, tag, ...) are
            // fluent passthroughs; anything else resolves by return type.
            match &descriptor.ret {
                Some(JavaType::Object(name)) if vocab::is_response_builder_class(name) => {
                    Value::Builder(state)
                }
                Some(JavaType::Object(name)) if vocab::is_response_class(name) => {
                    Value::Response(vec![state.into_response()])
                }
                ret => value_of_return(ret),
            }
        }
    }
}

enum Receiver {
    None,
    Instance,
    Special,
}

/// Push the invocation result unless the callee returns void. `value`
/// overrides the default type-derived result.
fn push_non_void(frame: &mut Frame, value: Option<Value>, descriptor: &MethodType) {
    if descriptor.ret.is_none() {
        return;
    }
    frame
        .stack
        .push(value.unwrap_or_else(|| value_of_return(&descriptor.ret)));
}

fn value_of_return(ret: &Option<JavaType>) -> Value {
    match ret {
        None => Value::Unknown,
        Some(ty) => Value::of_type(ty),
    }
}

fn value_of_descriptor(descriptor: &str) -> Value {
    match apimap_classfile::parse_type_descriptor(descriptor) {
        Ok(ty) => Value::of_type(&ty),
        Err(_) => Value::Unknown,
    }
}

/// Status code carried by a builder/factory `status` argument; the
/// sentinel `0` when the argument is not a literal the engine can read.
fn status_of(value: Option<&Value>) -> u16 {
    match value {
        Some(Value::Int(v)) if (100..=599).contains(v) => *v as u16,
        Some(Value::StatusConst(code)) => *code,
        _ => STATUS_UNKNOWN,
    }
}

fn entity_of(value: &Value) -> Option<String> {
    match value {
        Value::Str(_) => Some("java.lang.String".to_string()),
        Value::Int(_) => Some("int".to_string()),
        Value::Prim(kind) => Some(prim_name(*kind).to_string()),
        Value::Type(name) => Some(internal_to_binary(name)),
        Value::Cookie(_) => None,
        _ => None,
    }
}

fn prim_name(kind: VarKind) -> &'static str {
    match kind {
        VarKind::Int => "int",
        VarKind::Long => "long",
        VarKind::Float => "float",
        VarKind::Double => "double",
        VarKind::Ref => "java.lang.Object",
    }
}

fn collect_cookie_names(values: &[Value], out: &mut BTreeSet<String>) {
    for value in values {
        match value {
            Value::Cookie(Some(name)) => {
                out.insert(name.clone());
            }
            Value::Array(contents) => collect_cookie_names(&contents.borrow(), out),
            _ => {}
        }
    }
}

fn fold_int(op: &IntArith, lhs: &Value, rhs: &Value) -> Value {
    let (Value::Int(a), Value::Int(b)) = (lhs, rhs) else {
        return Value::Prim(VarKind::Int);
    };
    let (a, b) = (*a, *b);
    let folded = match op {
        IntArith::Add => Some(a.wrapping_add(b)),
        IntArith::Sub => Some(a.wrapping_sub(b)),
        IntArith::Mul => Some(a.wrapping_mul(b)),
        IntArith::Div => a.checked_div(b),
        IntArith::Rem => a.checked_rem(b),
        IntArith::And => Some(a & b),
        IntArith::Or => Some(a | b),
        IntArith::Xor => Some(a ^ b),
        IntArith::Shl => Some(a.wrapping_shl(b as u32)),
        IntArith::Shr => Some(a.wrapping_shr(b as u32)),
        IntArith::Ushr => Some(((a as u32).wrapping_shr(b as u32)) as i32),
    };
    folded.map(Value::Int).unwrap_or(Value::Prim(VarKind::Int))
}

/// Empty status sets default to 200: a body returned without an explicit
/// status is an OK response.
fn normalize(mut response: HttpResponse) -> HttpResponse {
    if response.statuses.is_empty() {
        response.statuses.insert(200);
    }
    response
}
