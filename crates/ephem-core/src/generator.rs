//! Concurrent, fail-fast generation of epoch tuple batches.
//!
//! Tuple computation is pure CPU-bound cryptography, so the generator runs
//! plain worker threads rather than an async runtime. Cipher contexts are
//! not shared between concurrently running workers: each epoch computation
//! checks one EBID context and one AES-OFB context out of bounded pools
//! and returns them when done. Concurrency is therefore capped at the
//! configured worker count, never one thread per epoch.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use tracing::debug;

use ephem_crypto::CryptoError;
use ephem_crypto::structure::{AesOfb, EbidCipher, EbidCipherKind};

use crate::pool::ContextPool;
use crate::protocol;
use crate::tuple::EphemeralTuple;

/// Generates contiguous runs of ephemeral tuples for one device.
///
/// Pools are sized to the worker count at construction; [`stop`] releases
/// them and rejects further batches.
///
/// [`stop`]: TupleGenerator::stop
pub struct TupleGenerator {
    ebid_pool: ContextPool<EbidCipher>,
    ecc_pool: ContextPool<AesOfb>,
    workers: usize,
    stopped: AtomicBool,
}

impl TupleGenerator {
    /// Pre-instantiate `workers` cipher contexts of each kind.
    ///
    /// `ebid_cipher` selects the 64-bit EBID cipher for this deployment;
    /// `ebid_key` must be 24 bytes and `federation_key` 32 bytes. A worker
    /// count of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyInitFailure`] if either key does not match
    /// its algorithm's required size.
    pub fn new(
        ebid_cipher: EbidCipherKind,
        ebid_key: &[u8],
        federation_key: &[u8],
        workers: usize,
    ) -> Result<Self, CryptoError> {
        let workers = workers.max(1);

        let mut ebid_contexts = Vec::with_capacity(workers);
        let mut ecc_contexts = Vec::with_capacity(workers);
        for _ in 0..workers {
            ebid_contexts.push(EbidCipher::new(ebid_cipher, ebid_key)?);
            ecc_contexts.push(AesOfb::new(federation_key)?);
        }

        Ok(Self {
            ebid_pool: ContextPool::new(ebid_contexts),
            ecc_pool: ContextPool::new(ecc_contexts),
            workers,
            stopped: AtomicBool::new(false),
        })
    }

    /// Produce tuples for epochs `[current_epoch, current_epoch + num_epochs)`.
    ///
    /// The result is ordered by epoch id regardless of worker completion
    /// order. On the first failing epoch the batch aborts: queued work is
    /// dropped, partial results are discarded and the failure is returned,
    /// so callers always receive either a complete bundle or an error.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::GeneratorStopped`] after [`stop`], or
    /// [`CryptoError::BatchGenerationFailure`] carrying the first epoch
    /// failure.
    ///
    /// [`stop`]: TupleGenerator::stop
    pub fn exec(
        &self,
        id_a: &[u8],
        current_epoch: u32,
        num_epochs: u32,
        country_code: u8,
    ) -> Result<Vec<EphemeralTuple>, CryptoError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(CryptoError::GeneratorStopped);
        }
        let total = num_epochs as usize;
        if total == 0 {
            return Ok(Vec::new());
        }

        let cursor = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let failure: Mutex<Option<CryptoError>> = Mutex::new(None);
        let results: Mutex<Vec<Option<EphemeralTuple>>> = Mutex::new(vec![None; total]);

        thread::scope(|scope| {
            for _ in 0..self.workers.min(total) {
                scope.spawn(|| {
                    let mut local: Vec<(usize, EphemeralTuple)> = Vec::new();

                    loop {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        if index >= total {
                            break;
                        }

                        let epoch = current_epoch.wrapping_add(index as u32);
                        match self.compute_tuple(id_a, epoch, country_code) {
                            Ok(tuple) => local.push((index, tuple)),
                            Err(cause) => {
                                abort.store(true, Ordering::Relaxed);
                                let mut slot = failure
                                    .lock()
                                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                                if slot.is_none() {
                                    *slot = Some(CryptoError::BatchGenerationFailure {
                                        epoch,
                                        cause: Box::new(cause),
                                    });
                                }
                                break;
                            }
                        }
                    }

                    let mut merged = results
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    for (index, tuple) in local {
                        merged[index] = Some(tuple);
                    }
                });
            }
        });

        if let Some(error) = failure
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
        {
            return Err(error);
        }

        let collected = results
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut tuples = Vec::with_capacity(total);
        for (index, slot) in collected.into_iter().enumerate() {
            match slot {
                Some(tuple) => tuples.push(tuple),
                // Only reachable if the pools were closed mid-batch
                None => {
                    return Err(CryptoError::BatchGenerationFailure {
                        epoch: current_epoch.wrapping_add(index as u32),
                        cause: Box::new(CryptoError::GeneratorStopped),
                    });
                }
            }
        }
        Ok(tuples)
    }

    fn compute_tuple(
        &self,
        id_a: &[u8],
        epoch: u32,
        country_code: u8,
    ) -> Result<EphemeralTuple, CryptoError> {
        let ebid_cipher = self.ebid_pool.checkout()?;
        let ecc_cipher = self.ecc_pool.checkout()?;
        protocol::generate_ephemeral_tuple(&ebid_cipher, &ecc_cipher, epoch, id_a, country_code)
    }

    /// Release the cipher pools and reject further `exec` calls.
    /// Idempotent.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.ebid_pool.close();
            self.ecc_pool.close();
            debug!("tuple generator stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EBID_KEY: [u8; 24] = [0x42; 24];
    const FEDERATION_KEY: [u8; 32] = [0x24; 32];
    const ID_A: [u8; 5] = [0xa0, 0xa1, 0xa2, 0xa3, 0xa4];
    const COUNTRY_CODE: u8 = 0x33;

    fn generator(workers: usize) -> TupleGenerator {
        TupleGenerator::new(EbidCipherKind::Skinny64, &EBID_KEY, &FEDERATION_KEY, workers).unwrap()
    }

    /// Single-threaded reference run against which concurrent output is
    /// compared bit-for-bit.
    fn reference(current_epoch: u32, num_epochs: u32) -> Vec<EphemeralTuple> {
        let ebid_cipher = EbidCipher::new(EbidCipherKind::Skinny64, &EBID_KEY).unwrap();
        let ecc_cipher = AesOfb::new(&FEDERATION_KEY).unwrap();
        (0..num_epochs)
            .map(|i| {
                protocol::generate_ephemeral_tuple(
                    &ebid_cipher,
                    &ecc_cipher,
                    current_epoch + i,
                    &ID_A,
                    COUNTRY_CODE,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_epochs_ordered_with_small_pool() {
        // Pool much smaller than the batch: ordering must still hold
        let generator = generator(2);
        let tuples = generator.exec(&ID_A, 3000, 96, COUNTRY_CODE).unwrap();

        assert_eq!(tuples.len(), 96);
        for (i, tuple) in tuples.iter().enumerate() {
            assert_eq!(tuple.epoch_id, 3000 + i as u32);
        }
    }

    #[test]
    fn test_concurrent_matches_reference_run() {
        let generator = generator(4);
        let tuples = generator.exec(&ID_A, 1234, 64, COUNTRY_CODE).unwrap();
        assert_eq!(tuples, reference(1234, 64));
    }

    #[test]
    fn test_exec_is_deterministic() {
        let generator = generator(3);
        let first = generator.exec(&ID_A, 42, 30, COUNTRY_CODE).unwrap();
        let second = generator.exec(&ID_A, 42, 30, COUNTRY_CODE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_batch() {
        let generator = generator(2);
        assert!(generator.exec(&ID_A, 10, 0, COUNTRY_CODE).unwrap().is_empty());
    }

    #[test]
    fn test_bad_id_a_fails_whole_batch() {
        let generator = generator(2);
        let err = generator.exec(&[0u8; 4], 10, 8, COUNTRY_CODE).unwrap_err();
        match err {
            CryptoError::BatchGenerationFailure { cause, .. } => {
                assert!(matches!(*cause, CryptoError::LengthMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stop_is_idempotent_and_rejects_exec() {
        let generator = generator(2);
        generator.stop();
        generator.stop();
        assert!(matches!(
            generator.exec(&ID_A, 1, 4, COUNTRY_CODE),
            Err(CryptoError::GeneratorStopped)
        ));
    }

    #[test]
    fn test_zero_workers_clamped() {
        let generator = generator(0);
        let tuples = generator.exec(&ID_A, 7, 3, COUNTRY_CODE).unwrap();
        assert_eq!(tuples.len(), 3);
    }
}
