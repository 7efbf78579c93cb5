use super::{Address, Array, Stack, Val, ValType, MAX_CALL_DEPTH};
use crate::error;
use crate::lang::ident::{self, Sigil};
use crate::lang::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Execution context
///
/// Variable memory, the call frame stack, the program counter,
/// keyboard state and the random number generator.
/// Names are case-insensitive; the last spelling used is remembered
/// for display.

pub struct Context {
    globals: HashMap<String, Val>,
    names: HashMap<String, Rc<str>>,
    frames: Stack<Scope>,
    pc: Address,
    keys: KeyState,
    rng: StdRng,
}

/// One SUB invocation.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    locals: HashMap<String, Val>,
    by_ref: HashMap<String, Rc<str>>,
    return_address: Option<Address>,
}

/// Keys currently held plus the most recent key pressed.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    down: HashSet<String>,
    last: String,
}

enum Slot {
    Global(String),
    Local(usize, String),
}

impl Default for Context {
    fn default() -> Self {
        Context {
            globals: HashMap::new(),
            names: HashMap::new(),
            frames: Stack::new("TOO MANY NESTED CALLS", MAX_CALL_DEPTH),
            pc: 0,
            keys: KeyState::default(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("pc", &self.pc)
            .field("globals", &self.globals)
            .field("frames", &self.frames)
            .finish()
    }
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Forget all variables and frames. Keys and the generator survive.
    pub fn clear(&mut self) {
        self.globals.clear();
        self.names.clear();
        self.frames.clear();
        self.pc = 0;
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn set_pc(&mut self, pc: Address) {
        self.pc = pc;
    }

    /// Read a variable. Missing variables read as the default for their
    /// sigil and are not created.
    pub fn get(&mut self, name: &str) -> Val {
        self.remember(name);
        self.peek(name)
    }

    /// Read a variable without recording its spelling.
    pub fn peek(&self, name: &str) -> Val {
        match self.lookup(name) {
            Some(val) => val.clone(),
            None => Val::default_for_name(name),
        }
    }

    /// Read one element of an array variable without copying the array.
    pub fn element(&mut self, name: &str, indices: &[i64]) -> Result<Val> {
        self.remember(name);
        match self.lookup(name) {
            Some(Val::Array(array)) => array.get(indices),
            Some(v) => Err(error!(TypeMismatch; &format!("{} is not an array", v.val_type()))),
            None => Array::dynamic(ValType::Integer).get(indices),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Val> {
        match self.locate(&ident::key(name), self.level(), false) {
            Slot::Global(key) => self.globals.get(&key),
            Slot::Local(level, key) => self.frames.get(level).and_then(|s| s.locals.get(&key)),
        }
    }

    /// Store a value, coerced to the type the name's sigil demands.
    /// A BYREF alias always redirects to the caller's variable.
    pub fn set(&mut self, name: &str, value: Val, is_local: bool) -> Result<()> {
        let value = typed(name, value)?;
        self.remember(name);
        match self.locate(&ident::key(name), self.level(), is_local) {
            Slot::Global(key) => {
                self.globals.insert(key, value);
            }
            Slot::Local(level, key) => {
                if let Some(scope) = self.frames.get_mut(level) {
                    scope.locals.insert(key, value);
                }
            }
        }
        Ok(())
    }

    /// Mutable access for element and member writes. Creates the default
    /// value in whichever scope `set` would have used.
    pub fn slot_mut(&mut self, name: &str) -> Result<&mut Val> {
        self.remember(name);
        match self.locate(&ident::key(name), self.level(), false) {
            Slot::Global(key) => Ok(self
                .globals
                .entry(key)
                .or_insert_with(|| Val::default_for_name(name))),
            Slot::Local(level, key) => match self.frames.get_mut(level) {
                Some(scope) => Ok(scope
                    .locals
                    .entry(key)
                    .or_insert_with(|| Val::default_for_name(name))),
                None => Err(error!(InternalError; "SCOPE VANISHED")),
            },
        }
    }

    pub fn has(&self, name: &str) -> bool {
        match self.locate(&ident::key(name), self.level(), false) {
            Slot::Global(key) => self.globals.contains_key(&key),
            Slot::Local(level, key) => self
                .frames
                .get(level)
                .map_or(false, |s| s.locals.contains_key(&key)),
        }
    }

    /// True when the innermost call frame owns `name` or aliases it.
    pub fn has_local(&self, name: &str) -> bool {
        let key = ident::key(name);
        self.frames
            .last()
            .map_or(false, |s| s.locals.contains_key(&key) || s.by_ref.contains_key(&key))
    }

    /// The spelling most recently used for `name`.
    pub fn canonical_name(&self, name: &str) -> String {
        match self.names.get(&ident::key(name)) {
            Some(spelling) => spelling.to_string(),
            None => name.to_string(),
        }
    }

    /// Enter a SUB. `by_ref` maps parameter names to the caller's variables.
    pub fn push_frame(
        &mut self,
        return_address: Option<Address>,
        by_ref: HashMap<String, Rc<str>>,
    ) -> Result<()> {
        let by_ref = by_ref
            .into_iter()
            .map(|(param, target)| (ident::key(&param), target))
            .collect();
        self.frames.push(Scope {
            locals: HashMap::new(),
            by_ref,
            return_address,
        })
    }

    pub fn pop_frame(&mut self) -> Option<Address> {
        self.frames.pop().and_then(|s| s.return_address)
    }

    pub fn current_return_address(&self) -> Option<Address> {
        self.frames.last().and_then(|s| s.return_address)
    }

    /// Line that made the call which opened frame `depth + 1`.
    pub fn call_site(&self, depth: usize) -> Option<Address> {
        self.frames
            .get(depth)
            .and_then(|s| s.return_address)
            .map(|address| address.saturating_sub(1))
    }

    /// Number of active call frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Globals by their display name, sorted.
    pub fn variables(&self) -> Vec<(String, Val)> {
        let mut vars: Vec<(String, Val)> = self
            .globals
            .iter()
            .map(|(key, val)| (self.canonical_name(key), val.clone()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    /// Locals of the innermost call frame, sorted.
    pub fn locals(&self) -> Vec<(String, Val)> {
        let mut vars: Vec<(String, Val)> = match self.frames.last() {
            Some(scope) => scope
                .locals
                .iter()
                .map(|(key, val)| (self.canonical_name(key), val.clone()))
                .collect(),
            None => vec![],
        };
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    pub fn set_keys(&mut self, keys: KeyState) {
        self.keys = keys;
    }

    /// Uniform in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn randomize(&mut self, seed: Option<u64>) {
        self.rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let now = chrono::Utc::now();
                let seed = (now.timestamp() as u64) << 32 ^ now.timestamp_subsec_nanos() as u64;
                StdRng::seed_from_u64(seed)
            }
        };
    }

    fn remember(&mut self, name: &str) {
        let key = ident::key(name);
        match self.names.get(&key) {
            Some(spelling) if spelling.as_ref() == name => {}
            _ => {
                self.names.insert(key, name.into());
            }
        }
    }

    fn level(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    fn locate(&self, key: &str, level: Option<usize>, is_local: bool) -> Slot {
        if let Some(level) = level {
            if let Some(scope) = self.frames.get(level) {
                if let Some(target) = scope.by_ref.get(key) {
                    return self.locate(&ident::key(target), level.checked_sub(1), false);
                }
                if is_local || scope.locals.contains_key(key) {
                    return Slot::Local(level, key.to_string());
                }
            }
        }
        Slot::Global(key.to_string())
    }
}

fn typed(name: &str, value: Val) -> Result<Val> {
    let target = ValType::of(Sigil::of(name));
    if ident::is_array(name) {
        match value {
            Val::Array(array) => Ok(Val::Array(Box::new(array.retype(target)?))),
            other => Err(error!(TypeMismatch; &format!("Cannot assign {} to array", other.val_type()))),
        }
    } else {
        value.coerce(target)
    }
}

impl KeyState {
    pub fn press(&mut self, key: &str) {
        self.down.insert(key.to_ascii_uppercase());
        self.last = key.to_string();
    }

    pub fn release(&mut self, key: &str) {
        self.down.remove(&key.to_ascii_uppercase());
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.down.contains(&key.to_ascii_uppercase())
    }

    pub fn last_key(&self) -> &str {
        &self.last
    }
}
