use super::exec::{Machine, Status};
use super::frame::{self, Frame, FrameState, Frames, TryPhase};
use super::{Address, Context, Program, Val};
use crate::error;
use crate::host::Host;
use crate::lang::ast::Statement;
use crate::lang::Error;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, Error>;

/// Outcome of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    End,
}

/// What the host loop should do after `execute`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Cycle budget used up; call again.
    Running,
    /// SLEEP is pending; call again after this instant.
    Sleeping(DateTime<Utc>),
    Stopped,
    Error(Error),
}

/// ## Runtime
///
/// One interpreter session: the program, its execution context, the
/// control frame stack and the host collaborators. Execution is a
/// cooperative stepper; nothing here blocks.

pub struct Runtime {
    program: Program,
    context: Context,
    frames: Frames,
    host: Host,
    sleep_until: Option<DateTime<Utc>>,
    stopped: bool,
    interrupted: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(Program::default())
    }
}

impl Runtime {
    pub fn new(program: Program) -> Runtime {
        Runtime {
            program,
            context: Context::default(),
            frames: frame::new_frames(),
            host: Host::default(),
            sleep_until: None,
            stopped: false,
            interrupted: false,
        }
    }

    pub fn with_host(mut self, host: Host) -> Runtime {
        self.host = host;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Runtime {
        self.context.randomize(Some(seed));
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Editing a running program leaves its frames pointing at old lines;
    /// call `reset` afterwards.
    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn frames(&self) -> Vec<&Frame> {
        self.frames.iter().collect()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn pc(&self) -> Address {
        self.context.pc()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Start over from the first line with empty memory.
    pub fn reset(&mut self) {
        self.context.clear();
        self.frames.clear();
        self.sleep_until = None;
        self.stopped = false;
        self.interrupted = false;
    }

    /// Cooperative stop; honoured at the next `execute`.
    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }

    /// Drop a pending SLEEP.
    pub fn wake(&mut self) {
        self.sleep_until = None;
    }

    /// Execute exactly one statement.
    pub fn step(&mut self) -> Result<Step> {
        if self.stopped {
            return Ok(Step::End);
        }
        let pc = self.context.pc();
        let statement = match self.program.get(pc) {
            Some(statement) => statement,
            None => {
                self.stopped = true;
                return Ok(Step::End);
            }
        };
        trace!(line = pc, depth = self.context.depth(), "step");
        let mut machine = Machine::new(
            &self.program,
            &mut self.context,
            &mut self.frames,
            &mut self.host,
        );
        let result = machine.execute(statement);
        if let Some(delay) = machine.sleep {
            let delay = chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
            self.sleep_until = Some(Utc::now() + delay);
        }
        match result {
            Ok(Status::Next) => self.context.set_pc(pc + 1),
            Ok(Status::Goto(address)) => self.context.set_pc(address),
            Ok(Status::Return) => return Ok(self.return_from_call()),
            Ok(Status::End) => {
                self.stopped = true;
                return Ok(Step::End);
            }
            Err(error) => {
                if let Err(error) = self.recover(error.in_line(pc)) {
                    self.stopped = true;
                    return Err(error);
                }
            }
        }
        Ok(Step::Continue)
    }

    /// Run up to `cycles` statements.
    pub fn execute(&mut self, cycles: usize) -> Event {
        if let Some(until) = self.sleep_until {
            if Utc::now() < until && !self.interrupted {
                return Event::Sleeping(until);
            }
            self.sleep_until = None;
        }
        if self.interrupted {
            self.interrupted = false;
            if !self.stopped {
                self.stopped = true;
                return Event::Error(error!(Break, self.context.pc()));
            }
        }
        if self.stopped {
            return Event::Stopped;
        }
        for _ in 0..cycles {
            match self.step() {
                Ok(Step::Continue) => {
                    if let Some(until) = self.sleep_until {
                        return Event::Sleeping(until);
                    }
                }
                Ok(Step::End) => return Event::Stopped,
                Err(error) => return Event::Error(error),
            }
        }
        Event::Running
    }

    fn return_from_call(&mut self) -> Step {
        if self.context.depth() == 0 {
            debug!(line = self.context.pc(), "RETURN with no caller");
            self.stopped = true;
            return Step::End;
        }
        let address = self.context.pop_frame();
        frame::unwind_calls(&mut self.frames, self.context.depth());
        debug!(?address, depth = self.context.depth(), "return");
        match address {
            Some(address) => {
                self.context.set_pc(address);
                Step::Continue
            }
            None => {
                self.stopped = true;
                Step::End
            }
        }
    }

    /// Route a recoverable error to the nearest TRY that can take it:
    /// its CATCH while still in the body, otherwise its FINALLY with the
    /// error held until END TRY. Only a TRY whose body or CATCH holds the
    /// failing line, or the call that led to it, takes the error; one
    /// that was left by a jump is dropped.
    fn recover(&mut self, error: Error) -> Result<()> {
        if error.is_structural() {
            return Err(error);
        }
        let mut index = self.frames.len();
        while index > 0 {
            index -= 1;
            let (start, end, phase, catch, finally, call_depth) = match self.frames.get(index) {
                Some(Frame {
                    start,
                    end,
                    state:
                        FrameState::Try {
                            phase,
                            catch,
                            finally,
                            ..
                        },
                    call_depth,
                }) => (*start, *end, *phase, *catch, *finally, *call_depth),
                _ => continue,
            };
            let region = match (phase, catch) {
                (TryPhase::Body, _) => Some((start, catch.or(finally).unwrap_or(end))),
                (TryPhase::Catch, Some(catch)) => Some((catch, finally.unwrap_or(end))),
                _ => None,
            };
            let (from, to) = match region {
                Some(region) => region,
                None => continue,
            };
            if !self.failed_within(call_depth, from, to) {
                debug!(line = start, "dropping TRY left by a jump");
                self.frames.remove(index);
                continue;
            }
            let (resume, next_phase, pending) = match (phase, catch, finally) {
                (TryPhase::Body, Some(catch), _) => (catch, TryPhase::Catch, None),
                (TryPhase::Body, None, Some(finally)) | (TryPhase::Catch, _, Some(finally)) => {
                    (finally, TryPhase::Finally, Some(error.clone()))
                }
                _ => continue,
            };
            while self.context.depth() > call_depth {
                self.context.pop_frame();
            }
            self.frames.truncate(index + 1);
            if let Some(frame) = self.frames.get_mut(index) {
                if let FrameState::Try {
                    phase,
                    pending: held,
                    ..
                } = &mut frame.state
                {
                    *phase = next_phase;
                    *held = pending;
                }
            }
            if next_phase == TryPhase::Catch {
                if let Some(Statement::Catch(Some(name))) = self.program.get(resume) {
                    let is_local = self.context.has_local(name);
                    let message = Val::String(error.description().into());
                    self.context.set(name, message, is_local)?;
                }
            }
            debug!(%error, resume, "error recovered by TRY");
            self.context.set_pc(resume + 1);
            return Ok(());
        }
        Err(error)
    }

    /// Whether the failing line, seen from call depth `call_depth`, lies
    /// strictly between lines `from` and `to`.
    fn failed_within(&self, call_depth: usize, from: Address, to: Address) -> bool {
        let depth = self.context.depth();
        let line = if call_depth == depth {
            Some(self.context.pc())
        } else if call_depth < depth {
            self.context.call_site(call_depth)
        } else {
            None
        };
        matches!(line, Some(line) if from < line && line < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::{Expression, Statement, Variable};

    fn runtime(statements: Vec<Statement>) -> Runtime {
        Runtime::new(Program::from_statements(statements))
    }

    #[test]
    fn test_step_advances_and_ends() {
        let mut r = runtime(vec![Statement::Let(
            Variable::from("a%"),
            Expression::from(7),
        )]);
        assert_eq!(r.step(), Ok(Step::Continue));
        assert_eq!(r.pc(), 1);
        assert_eq!(r.step(), Ok(Step::End));
        assert!(r.is_stopped());
        assert_eq!(r.context_mut().get("a%"), Val::Integer(7));
    }

    #[test]
    fn test_error_carries_line() {
        let mut r = runtime(vec![
            Statement::Rem("".into()),
            Statement::Goto("nowhere".into()),
        ]);
        match r.execute(10) {
            Event::Error(e) => assert_eq!(e.line(), Some(1)),
            e => panic!("{:?}", e),
        }
        assert_eq!(r.execute(10), Event::Stopped);
    }

    #[test]
    fn test_interrupt() {
        let mut r = runtime(vec![
            Statement::Label("top".into()),
            Statement::Goto("top".into()),
        ]);
        assert_eq!(r.execute(100), Event::Running);
        r.interrupt();
        match r.execute(100) {
            Event::Error(e) => assert!(e.is(crate::lang::ErrorCode::Break)),
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_sleep_defers() {
        let mut r = runtime(vec![
            Statement::Sleep(Expression::from(60)),
            Statement::End,
        ]);
        match r.execute(10) {
            Event::Sleeping(until) => assert!(until > Utc::now()),
            e => panic!("{:?}", e),
        }
        assert!(matches!(r.execute(10), Event::Sleeping(_)));
        r.wake();
        assert_eq!(r.execute(10), Event::Stopped);
    }

    #[test]
    fn test_return_without_call_halts() {
        let mut r = runtime(vec![Statement::Return, Statement::Print(vec![])]);
        assert_eq!(r.execute(10), Event::Stopped);
        assert_eq!(r.pc(), 0);
    }
}
