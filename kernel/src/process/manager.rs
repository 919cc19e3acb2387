//! Process manager - handles process lifecycle and scheduling

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::creation::{load_image, validate_args};
use super::{exec, fork, Process, ProcessError, ProcessId, UserContext};
use crate::config::KernelConfig;

/// PID that adopts orphans.
pub const INIT_PID: ProcessId = ProcessId::new(1);

/// Process manager handles all processes in the system
pub struct ProcessManager {
    /// All processes indexed by PID
    processes: BTreeMap<ProcessId, Process>,

    /// Currently running process
    current_pid: Option<ProcessId>,

    /// Next available PID
    next_pid: u64,

    /// Queue of ready processes
    ready_queue: Vec<ProcessId>,

    config: KernelConfig,
}

impl ProcessManager {
    /// Create a new process manager
    pub fn new(config: KernelConfig) -> Self {
        ProcessManager {
            processes: BTreeMap::new(),
            current_pid: None,
            next_pid: 1, // PIDs start at 1 (0 is kernel)
            ready_queue: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn allocate_pid(&mut self) -> Result<ProcessId, ProcessError> {
        if self.processes.len() >= self.config.max_processes {
            log::warn!(
                "process table full ({} entries)",
                self.config.max_processes
            );
            return Err(ProcessError::TooManyProcesses);
        }
        let pid = ProcessId::new(self.next_pid);
        self.next_pid += 1;
        Ok(pid)
    }

    /// Create a parentless process running `program`
    pub fn create_process(
        &mut self,
        program: &str,
        argv: Vec<String>,
    ) -> Result<ProcessId, ProcessError> {
        let image = self
            .config
            .find_program(program)
            .ok_or(ProcessError::NoSuchProgram)?;
        let loaded = load_image(image, &argv, self.config.user_memory_size)?;
        let pid = self.allocate_pid()?;

        let mut process = Process::new(
            pid,
            String::from(image.name),
            image.entry_point,
            loaded.memory,
            loaded.context,
        );
        process.argv = argv;

        self.processes.insert(pid, process);
        self.ready_queue.push(pid);

        log::info!("Created process {} (PID {})", image.name, pid);

        Ok(pid)
    }

    /// Get the current process ID
    pub fn current_pid(&self) -> Option<ProcessId> {
        self.current_pid
    }

    #[cfg(test)]
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Set the current process ID (for direct execution)
    pub fn set_current_pid(&mut self, pid: ProcessId) {
        if let Some(old_pid) = self.current_pid.replace(pid) {
            if old_pid != pid {
                if let Some(old) = self.processes.get_mut(&old_pid) {
                    if !old.is_terminated() {
                        old.set_ready();
                    }
                }
            }
        }
        if let Some(process) = self.processes.get_mut(&pid) {
            process.set_running();
        }
    }

    /// Get a reference to a process
    pub fn get_process(&self, pid: ProcessId) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// Get a mutable reference to a process
    pub fn get_process_mut(&mut self, pid: ProcessId) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    /// The process that issued the syscall being handled
    pub fn current_process_mut(&mut self) -> Option<&mut Process> {
        let pid = self.current_pid?;
        self.processes.get_mut(&pid)
    }

    /// Fork `parent_pid`. `context` is the parent's live register state.
    pub fn fork_process(
        &mut self,
        parent_pid: ProcessId,
        context: &UserContext,
    ) -> Result<ProcessId, ProcessError> {
        if !self.processes.contains_key(&parent_pid) {
            return Err(ProcessError::NotFound);
        }
        let child_pid = self.allocate_pid()?;

        let parent = self
            .processes
            .get_mut(&parent_pid)
            .ok_or(ProcessError::NotFound)?;
        let child = fork::duplicate_process(parent, child_pid, context);
        parent.add_child(child_pid);

        self.processes.insert(child_pid, child);
        self.ready_queue.push(child_pid);

        log::info!("Fork complete: parent {} -> child {}", parent_pid, child_pid);

        Ok(child_pid)
    }

    /// Replace the image of `pid` with `program`. Returns the new argc.
    ///
    /// On failure the old image is left intact.
    pub fn exec_process(
        &mut self,
        pid: ProcessId,
        program: &str,
        argv: Vec<String>,
    ) -> Result<u64, ProcessError> {
        validate_args(&argv)?;
        let image = self
            .config
            .find_program(program)
            .ok_or(ProcessError::NoSuchProgram)?;
        let loaded = load_image(image, &argv, self.config.user_memory_size)?;
        let argc = loaded.argc;

        let process = self
            .processes
            .get_mut(&pid)
            .ok_or(ProcessError::NotFound)?;
        exec::replace_image(process, image, loaded, argv);

        Ok(argc)
    }

    /// Exit a process with the given exit code
    ///
    /// The process stays in the table as a zombie until its parent reaps it.
    /// Its children are handed to init. A process without a parent has no one
    /// to reap it and is removed at once.
    pub fn exit_process(&mut self, pid: ProcessId, exit_code: i32) {
        let (parent, children) = match self.processes.get_mut(&pid) {
            Some(process) => {
                log::info!(
                    "Process {} (PID {}) exiting with code {}",
                    process.name,
                    pid,
                    exit_code
                );
                process.terminate(exit_code);
                (process.parent, core::mem::take(&mut process.children))
            }
            None => return,
        };

        self.ready_queue.retain(|&p| p != pid);
        if self.current_pid == Some(pid) {
            self.current_pid = None;
        }

        self.reparent_children(pid, children);

        let parent_alive = parent.is_some_and(|ppid| self.processes.contains_key(&ppid));
        if !parent_alive {
            self.processes.remove(&pid);
        }
    }

    fn reparent_children(&mut self, pid: ProcessId, children: Vec<ProcessId>) {
        let adopter = if pid != INIT_PID && self.processes.contains_key(&INIT_PID) {
            Some(INIT_PID)
        } else {
            None
        };

        for child_pid in children {
            let orphan_zombie = match self.processes.get_mut(&child_pid) {
                Some(child) => {
                    child.parent = adopter;
                    adopter.is_none() && child.is_terminated()
                }
                None => false,
            };
            if orphan_zombie {
                self.processes.remove(&child_pid);
            } else if let Some(init) = adopter.and_then(|a| self.processes.get_mut(&a)) {
                init.add_child(child_pid);
            }
        }
    }

    /// Reap one terminated child of `parent_pid`
    ///
    /// Never blocks: `WouldBlock` means children exist but none has exited.
    pub fn reap_child(&mut self, parent_pid: ProcessId) -> Result<(ProcessId, i32), ProcessError> {
        let parent = self
            .processes
            .get(&parent_pid)
            .ok_or(ProcessError::NotFound)?;
        if parent.children.is_empty() {
            return Err(ProcessError::NoChildren);
        }

        let zombie = parent.children.iter().copied().find(|child| {
            self.processes
                .get(child)
                .is_some_and(|p| p.is_terminated())
        });
        let child_pid = zombie.ok_or(ProcessError::WouldBlock)?;

        let child = self
            .processes
            .remove(&child_pid)
            .ok_or(ProcessError::NotFound)?;
        if let Some(parent) = self.processes.get_mut(&parent_pid) {
            parent.remove_child(child_pid);
        }

        let code = child.exit_code.unwrap_or(0);
        log::debug!("reaped PID {} (exit code {})", child_pid, code);
        Ok((child_pid, code))
    }

    /// Get the next ready process to run
    pub fn schedule_next(&mut self) -> Option<ProcessId> {
        // Simple round-robin for now
        if self.ready_queue.is_empty() {
            return None;
        }
        let pid = self.ready_queue.remove(0);
        self.ready_queue.push(pid);
        self.set_current_pid(pid);
        Some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessState;
    use alloc::vec;

    fn manager() -> ProcessManager {
        ProcessManager::new(KernelConfig {
            max_processes: 4,
            user_memory_size: 4096,
            ..KernelConfig::default()
        })
    }

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn create_assigns_increasing_pids() {
        let mut pm = manager();
        let init = pm.create_process("init", argv(&["init"])).unwrap();
        let sh = pm.create_process("sh", argv(&["sh"])).unwrap();
        assert_eq!(init, INIT_PID);
        assert_eq!(sh.as_u64(), 2);
        assert_eq!(
            pm.create_process("nonexistent-binary", vec![]),
            Err(ProcessError::NoSuchProgram)
        );
    }

    #[test]
    fn schedule_is_round_robin() {
        let mut pm = manager();
        let a = pm.create_process("init", argv(&["init"])).unwrap();
        let b = pm.create_process("sh", argv(&["sh"])).unwrap();

        assert_eq!(pm.schedule_next(), Some(a));
        assert_eq!(pm.get_process(a).unwrap().state, ProcessState::Running);
        assert_eq!(pm.schedule_next(), Some(b));
        assert_eq!(pm.get_process(a).unwrap().state, ProcessState::Ready);
        assert_eq!(pm.schedule_next(), Some(a));
    }

    #[test]
    fn fork_respects_table_limit() {
        let mut pm = manager();
        let init = pm.create_process("init", argv(&["init"])).unwrap();
        let ctx = pm.get_process(init).unwrap().context;
        for _ in 0..3 {
            pm.fork_process(init, &ctx).unwrap();
        }
        assert_eq!(
            pm.fork_process(init, &ctx),
            Err(ProcessError::TooManyProcesses)
        );
        assert_eq!(pm.get_process(init).unwrap().children.len(), 3);
    }

    #[test]
    fn exec_failure_keeps_old_image() {
        let mut pm = manager();
        let pid = pm.create_process("syscount", argv(&["syscount"])).unwrap();
        assert_eq!(
            pm.exec_process(pid, "nonexistent-binary", argv(&["nonexistent-binary"])),
            Err(ProcessError::NoSuchProgram)
        );
        assert_eq!(pm.get_process(pid).unwrap().name, "syscount");

        assert_eq!(pm.exec_process(pid, "/echo", argv(&["echo", "hi"])), Ok(2));
        assert_eq!(pm.get_process(pid).unwrap().name, "echo");
    }

    #[test]
    fn wait_reaps_exited_children_only() {
        let mut pm = manager();
        let init = pm.create_process("init", argv(&["init"])).unwrap();
        assert_eq!(pm.reap_child(init), Err(ProcessError::NoChildren));

        let ctx = pm.get_process(init).unwrap().context;
        let child = pm.fork_process(init, &ctx).unwrap();
        assert_eq!(pm.reap_child(init), Err(ProcessError::WouldBlock));

        pm.exit_process(child, 3);
        assert_eq!(
            pm.get_process(child).map(|p| p.state),
            Some(ProcessState::Terminated(3))
        );
        assert_eq!(pm.reap_child(init), Ok((child, 3)));
        assert!(pm.get_process(child).is_none());
        assert_eq!(pm.reap_child(init), Err(ProcessError::NoChildren));
    }

    #[test]
    fn orphans_go_to_init() {
        let mut pm = manager();
        let init = pm.create_process("init", argv(&["init"])).unwrap();
        let ctx = pm.get_process(init).unwrap().context;
        let sh = pm.fork_process(init, &ctx).unwrap();
        let grandchild = pm.fork_process(sh, &ctx).unwrap();

        pm.exit_process(sh, 0);
        assert_eq!(pm.get_process(grandchild).unwrap().parent, Some(init));
        assert!(pm.get_process(init).unwrap().children.contains(&grandchild));
    }

    #[test]
    fn parentless_exit_removes_process() {
        let mut pm = manager();
        let init = pm.create_process("init", argv(&["init"])).unwrap();
        pm.set_current_pid(init);
        pm.exit_process(init, 0);
        assert!(pm.get_process(init).is_none());
        assert_eq!(pm.current_pid(), None);
        assert_eq!(pm.process_count(), 0);
    }
}
