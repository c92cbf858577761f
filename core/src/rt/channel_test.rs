#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{Result, bail};

    use crate::rt::{Callback, ChannelTickQueue, Runtime, RuntimeFlavor, Scheduler, SchedulerKind};
    use crate::val::{TickArgs, Val};

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Vec<i64>,
    }

    fn record(ctx: &mut Recorder, args: &[Val]) -> Result<()> {
        match args {
            [Val::Int(i), ..] => ctx.seen.push(*i),
            other => bail!("expected an Int first argument, got {:?}", other),
        }
        Ok(())
    }

    static RECORD: Callback<Recorder> = Callback::new("record", 1, record);

    fn one(i: i64) -> TickArgs {
        TickArgs::from_array([Val::Int(i)])
    }

    #[test]
    fn run_pending_drains_in_order() -> Result<()> {
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        for i in 0..5 {
            queue.defer(&RECORD, one(i))?;
        }
        assert_eq!(queue.kind(), SchedulerKind::Channel);
        assert_eq!(queue.pending(), 5);
        assert_eq!(queue.run_pending(&mut ctx)?, 5);
        assert_eq!(ctx.seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.stats().scheduled, 5);
        Ok(())
    }

    #[test]
    fn producers_on_other_threads_keep_their_order() -> Result<()> {
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        let sender = queue.sender();
        let producer = std::thread::spawn(move || -> Result<()> {
            for i in 0..100 {
                sender.defer(&RECORD, one(i))?;
            }
            Ok(())
        });
        producer.join().expect("producer thread panicked")?;

        assert_eq!(queue.run_pending(&mut ctx)?, 100);
        assert_eq!(ctx.seen, (0..100).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn run_until_waits_for_late_producers() -> Result<()> {
        let runtime = Runtime::new_current_thread()?;
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        let sender = queue.sender();
        let producer = std::thread::spawn(move || -> Result<()> {
            std::thread::sleep(Duration::from_millis(20));
            for i in 0..5 {
                sender.defer(&RECORD, one(i))?;
            }
            Ok(())
        });

        let invoked = runtime.block_on_timeout(
            queue.run_until(&mut ctx, |c| c.seen.len() == 5),
            Some(Duration::from_secs(10)),
        )?;
        producer.join().expect("producer thread panicked")?;
        assert_eq!(invoked, 5);
        assert_eq!(ctx.seen, vec![0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn run_until_times_out_when_ticks_never_arrive() -> Result<()> {
        let runtime = Runtime::new_current_thread()?;
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        queue.defer(&RECORD, one(1))?;

        let err = runtime
            .block_on_timeout(
                queue.run_until(&mut ctx, |c| c.seen.len() == 2),
                Some(Duration::from_millis(50)),
            )
            .expect_err("second tick is never scheduled");
        assert!(err.to_string().contains("timed out after"));
        assert_eq!(ctx.seen, vec![1]);
        Ok(())
    }

    #[test]
    fn run_until_leaves_ticks_past_completion_queued() -> Result<()> {
        let runtime = Runtime::new_current_thread()?;
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        for i in 0..4 {
            queue.defer(&RECORD, one(i))?;
        }
        let invoked = runtime.block_on(queue.run_until(&mut ctx, |c| c.seen.len() == 3))?;
        assert_eq!(invoked, 3);
        assert_eq!(queue.pending(), 1);
        Ok(())
    }

    #[test]
    fn long_drains_yield_and_finish_under_timeout() -> Result<()> {
        let runtime = Runtime::with_flavor(RuntimeFlavor::MultiThread)?;
        let mut queue = ChannelTickQueue::new();
        let mut ctx = Recorder::default();
        for i in 0..10_000 {
            queue.defer(&RECORD, one(i))?;
        }
        let invoked = runtime.block_on_timeout(
            queue.run_until(&mut ctx, |c| c.seen.len() == 10_000),
            Some(Duration::from_secs(30)),
        )?;
        assert_eq!(invoked, 10_000);
        assert_eq!(ctx.seen.last(), Some(&9_999));
        Ok(())
    }

    #[test]
    fn runtime_flavor_parses() {
        assert_eq!("multi-thread".parse::<RuntimeFlavor>().unwrap(), RuntimeFlavor::MultiThread);
        assert_eq!("current_thread".parse::<RuntimeFlavor>().unwrap(), RuntimeFlavor::CurrentThread);
        assert!("fibers".parse::<RuntimeFlavor>().is_err());
    }
}
