#[cfg(test)]
mod props {
    use std::io;

    use proptest::prelude::*;
    use valve_core::{Ceiling, Limit, Meter, Nil};

    struct Failing;

    impl io::Write for Failing {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn payload() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(any::<u8>(), 0..512)
    }

    proptest! {
        // An unlimited limit behaves like a plain meter.
        #[test]
        fn unlimited_write_moves_everything(data in payload()) {
            let mut limit: Limit<Nil, Vec<u8>> = Limit::writer(Vec::new(), Ceiling::Unlimited);
            let t = limit.write(&data);
            prop_assert!(t.is_ok());
            prop_assert_eq!(t.count, data.len());
            prop_assert_eq!(limit.count_write(), data.len() as i64);
        }

        // A request larger than the remaining capacity is cut to it.
        #[test]
        fn oversized_write_is_truncated(data in payload(), used in 0u64..256, seed in any::<u64>()) {
            let ceiling = used + seed % 256;
            let mut limit: Limit<Nil, Vec<u8>> = Limit::writer(Vec::new(), ceiling);
            limit.meter().set_count_write(used as i64);
            let rem = ceiling - used;

            let t = limit.write(&data);
            let len = data.len() as u64;
            if rem == 0 {
                prop_assert_eq!(t.count, 0);
                prop_assert!(t.error.unwrap().is(&limit.write_limit_error(len, 0)));
            } else if len > rem {
                prop_assert_eq!(t.count as u64, rem);
                prop_assert!(t.error.unwrap().is(&limit.write_limit_error(len, rem)));
                prop_assert_eq!(limit.count_write() as u64, ceiling);
            } else {
                prop_assert!(t.is_ok());
                prop_assert_eq!(t.count, data.len());
            }
            prop_assert!(limit.count_write() as u64 <= ceiling);
        }

        // Once the counter reaches the ceiling nothing more moves.
        #[test]
        fn exhausted_read_moves_nothing(data in payload(), ceiling in 0u64..128, extra in 0i64..64) {
            let mut limit = Limit::reader(data.as_slice(), ceiling);
            limit.meter().set_count_read(ceiling as i64 + extra);
            let mut buf = vec![0u8; data.len() + 1];

            let t = limit.read(&mut buf);
            prop_assert_eq!(t.count, 0);
            prop_assert!(t.error.unwrap().limit().is_some());
            prop_assert_eq!(limit.count_read(), ceiling as i64 + extra);
        }

        #[test]
        fn unlimited_ceiling_lifts_any_count(data in payload(), count in 0i64..1_000_000) {
            let mut limit = Limit::reader(data.as_slice(), 0u64);
            limit.meter().set_count_read(count);
            limit.set_max_count_read(Ceiling::Unlimited);
            let mut buf = vec![0u8; data.len()];

            let t = limit.read(&mut buf);
            prop_assert!(t.is_ok());
            prop_assert_eq!(t.count, data.len());
            prop_assert_eq!(&buf[..], &data[..]);
        }

        // A failing endpoint's error is reported even when the request was truncated.
        #[test]
        fn endpoint_error_beats_limit_error(len in 1usize..512, seed in any::<u64>()) {
            let ceiling = seed % len as u64 + 1;
            let mut limit = Limit::writer(Failing, ceiling);
            let data = vec![7u8; len];

            let t = limit.write(&data);
            prop_assert_eq!(t.count, 0);
            let err = t.error.unwrap();
            prop_assert!(err.limit().is_none());
            prop_assert_eq!(err.io_error().unwrap().kind(), io::ErrorKind::BrokenPipe);
            prop_assert_eq!(limit.count_write(), 0);
        }

        // A bounded drain moves min(ceiling, source length); a source that
        // ends short of the ceiling is reported as an unexpected EOF.
        #[test]
        fn bounded_read_from_moves_min(data in payload(), seed in any::<u64>()) {
            let ceiling = seed % 1024 + 1;
            let mut limit: Limit<Nil, Vec<u8>> = Limit::writer(Vec::new(), ceiling);

            let t = limit.read_from(&mut data.as_slice());
            let expect = ceiling.min(data.len() as u64);
            prop_assert_eq!(t.count, expect);
            prop_assert_eq!(limit.count_write() as u64, expect);
            if (data.len() as u64) < ceiling {
                let err = t.error.unwrap();
                prop_assert!(err.limit().is_none());
                prop_assert_eq!(err.io_error().unwrap().kind(), io::ErrorKind::UnexpectedEof);
            } else {
                prop_assert!(t.is_ok());
            }
            prop_assert_eq!(limit.meter().get_writer().unwrap().as_slice(), &data[..expect as usize]);
        }

        // The meter counts exactly what the endpoint moved.
        #[test]
        fn meter_counts_match_transfers(chunks in proptest::collection::vec(payload(), 0..8)) {
            let mut meter = Meter::writer(Vec::<u8>::new());
            let mut total = 0usize;
            for chunk in &chunks {
                total += meter.write(chunk).count;
            }
            prop_assert_eq!(meter.count_write(), total as i64);
            prop_assert_eq!(meter.get_writer().unwrap().len(), total);
        }
    }
}
