//! src/worker.rs

use std::sync::mpsc::Sender;

/// Fans the candidate batch out across a fixed pool of workers.
///
/// Every worker loops "receive candidate, apply `transform`, send result"
/// until the input queue is closed and drained, so exactly one result is sent
/// per candidate. Results arrive in no particular order. The function returns
/// once the whole batch is finished; `results` is dropped on return, which
/// ends the consumer's iteration.
///
/// `transform` must be total: lookup failures are encoded into the returned
/// string, never raised.
pub fn run<F>(candidates: Vec<String>, workers: usize, transform: F, results: Sender<String>)
where
    F: Fn(&str) -> String + Sync,
{
    let workers = workers.max(1);
    // The input queue holds the whole batch, so the fill loop below never
    // blocks on a slow worker.
    let (job_sender, job_receiver) = crossbeam_channel::bounded::<String>(candidates.len());

    rayon::scope(|scope| {
        for _ in 0..workers {
            let jobs = job_receiver.clone();
            let results = results.clone();
            let transform = &transform;
            scope.spawn(move |_| {
                for candidate in jobs {
                    // The driver keeps its receiver alive until we are done.
                    let _ = results.send(transform(&candidate));
                }
            });
        }

        for candidate in candidates {
            if job_sender.send(candidate).is_err() {
                break;
            }
        }
        // Closing the queue lets the workers finish their in-flight items and
        // exit once it runs dry.
        drop(job_sender);
    });
}
