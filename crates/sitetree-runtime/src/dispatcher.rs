#![forbid(unsafe_code)]

//! Reference host for [`TreeEditor`](crate::editor::TreeEditor).
//!
//! The [`Dispatcher`] owns a backend, queues the side effects a model asks
//! for, and turns each executed effect into the answering message. Queued
//! work can be completed in order, in reverse, or by ticket, which is how
//! tests reproduce slow and out-of-order backends.

use std::collections::VecDeque;

use crate::editor::EditorMsg;
use crate::gateway::{PageRepository, PersistRequest, PersistenceGateway, RepositoryOp};
use crate::program::{Cmd, Model, Ticket};

/// A side effect waiting to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Persist {
        ticket: Ticket,
        request: PersistRequest,
    },
    Refetch,
    Repository(RepositoryOp),
}

/// Command queue in front of a backend.
#[derive(Debug)]
pub struct Dispatcher<B> {
    backend: B,
    queue: VecDeque<Pending>,
}

impl<B> Dispatcher<B>
where
    B: PersistenceGateway + PageRepository,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            queue: VecDeque::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Queued effects, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Pending> {
        self.queue.iter()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue the effects of `cmd`. Messages in the command are returned for
    /// immediate delivery.
    pub fn submit(&mut self, cmd: Cmd<EditorMsg>) -> Vec<EditorMsg> {
        let mut immediate = Vec::new();
        for leaf in cmd.into_leaves() {
            match leaf {
                Cmd::Msg(msg) => immediate.push(msg),
                Cmd::Persist { ticket, request } => {
                    self.queue.push_back(Pending::Persist { ticket, request });
                }
                Cmd::Refetch => self.queue.push_back(Pending::Refetch),
                Cmd::Repository(op) => self.queue.push_back(Pending::Repository(op)),
                Cmd::None | Cmd::Batch(_) => {}
            }
        }
        immediate
    }

    /// Run the oldest queued effect.
    pub fn complete_next(&mut self) -> Option<EditorMsg> {
        let pending = self.queue.pop_front()?;
        Some(self.execute(pending))
    }

    /// Run the newest queued effect.
    pub fn complete_last(&mut self) -> Option<EditorMsg> {
        let pending = self.queue.pop_back()?;
        Some(self.execute(pending))
    }

    /// Run the persist call issued under `ticket`.
    pub fn complete_ticket(&mut self, ticket: Ticket) -> Option<EditorMsg> {
        let pos = self.queue.iter().position(|pending| {
            matches!(pending, Pending::Persist { ticket: queued, .. } if *queued == ticket)
        })?;
        let pending = self.queue.remove(pos)?;
        Some(self.execute(pending))
    }

    fn execute(&mut self, pending: Pending) -> EditorMsg {
        match pending {
            Pending::Persist { ticket, request } => {
                let result = self.backend.persist(&request);
                tracing::debug!(
                    target: "sitetree.gateway",
                    %ticket,
                    ok = result.is_ok(),
                    "persist call finished"
                );
                EditorMsg::Persisted { ticket, result }
            }
            Pending::Refetch => EditorMsg::Refetched(self.backend.list_pages()),
            Pending::Repository(op) => EditorMsg::Edited(self.backend.execute(op)),
        }
    }

    /// Deliver `msg` to `model`, then keep executing queued effects in
    /// order and delivering their answers until the queue is empty.
    pub fn run<M>(&mut self, model: &mut M, msg: EditorMsg)
    where
        M: Model<Message = EditorMsg>,
    {
        let mut inbox = VecDeque::from([msg]);
        loop {
            while let Some(msg) = inbox.pop_front() {
                let cmd = model.update(msg);
                inbox.extend(self.submit(cmd));
            }
            match self.complete_next() {
                Some(answer) => inbox.push_back(answer),
                None => break,
            }
        }
    }

    /// Run `model`'s startup commands to completion.
    pub fn start<M>(&mut self, model: &mut M)
    where
        M: Model<Message = EditorMsg>,
    {
        let cmd = model.init();
        let immediate = self.submit(cmd);
        let mut answers: Vec<EditorMsg> = immediate;
        while let Some(answer) = self.complete_next() {
            answers.push(answer);
        }
        for msg in answers {
            self.run(model, msg);
        }
    }
}
