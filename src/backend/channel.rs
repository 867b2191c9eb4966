//! Lock-free backend on top of an unbounded MPMC channel.

use super::TaskQueue;
use crate::task::Task;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;

pub(crate) struct ChannelQueue<C: 'static> {
    tx: Sender<Task<C>>,
    rx: Receiver<Task<C>>,
}

impl<C: 'static> ChannelQueue<C> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl<C: Send + 'static> TaskQueue<C> for ChannelQueue<C> {
    fn push(&self, task: Task<C>) {
        // The receiving half lives in self, so the channel cannot be
        // disconnected while a push is possible.
        let _ = self.tx.send(task);
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<Task<C>> {
        self.rx.recv_timeout(timeout).ok()
    }

    fn len(&self) -> usize {
        self.rx.len()
    }

    // wake_all: timed receives expire on their own; nothing to signal.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::time::Instant;

    fn probe_task(value: u32) -> (Task<()>, crossbeam_channel::Receiver<crate::Result<u32>>) {
        let (tx, rx) = bounded(1);
        (Task::new(move |_| value, tx), rx)
    }

    #[test]
    fn push_then_pop() {
        let queue = ChannelQueue::new();
        let (task, rx) = probe_task(7);
        queue.push(task);
        assert_eq!(queue.len(), 1);

        let task = queue.pop_timeout(Duration::from_millis(10)).unwrap();
        task.run(&mut ());
        assert_eq!(rx.recv().unwrap().unwrap(), 7);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn pop_times_out_when_empty() {
        let queue: ChannelQueue<()> = ChannelQueue::new();
        let start = Instant::now();
        assert!(queue.pop_timeout(Duration::from_millis(20)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
