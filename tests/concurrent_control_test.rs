// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证货载行乐观锁与并发预订的一致性
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use std::sync::mpsc;
    use std::thread;

    use freight_broker::api::{ApiError, CreateBookingRequest};
    use freight_broker::domain::types::{BookingStatus, LoadStatus};
    use freight_broker::repository::RepositoryError;

    use crate::test_helpers::{
        assert_load_invariants, register_transporter, sample_bid_request, sample_load_request,
        setup_test_env,
    };

    #[test]
    fn test_stale_version_update_fails() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();

        // 两份同版本快照
        let mut snapshot_a = env.load_repo.find_by_id(&load.load_id).unwrap().unwrap();
        let mut snapshot_b = env.load_repo.find_by_id(&load.load_id).unwrap().unwrap();
        assert_eq!(snapshot_a.version, snapshot_b.version);

        snapshot_a.remaining_trucks = 1;
        env.load_repo.update(&snapshot_a).unwrap();

        // 第二份快照携带旧版本,CAS 必败
        snapshot_b.remaining_trucks = 0;
        snapshot_b.status = LoadStatus::Booked;
        let result = env.load_repo.update(&snapshot_b);
        match result {
            Err(RepositoryError::OptimisticLockFailure {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("预期 OptimisticLockFailure,实际: {:?}", other),
        }

        // 落库内容是先赢者的
        let fetched = env.load_repo.find_by_id(&load.load_id).unwrap().unwrap();
        assert_eq!(fetched.remaining_trucks, 1);
        assert_eq!(fetched.version, 1);
    }

    #[test]
    fn test_update_missing_load_reports_not_found() {
        let (_tmp, env) = setup_test_env().unwrap();

        let mut load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 1))
            .unwrap();
        load.load_id = "missing-id".to_string();

        let result = env.load_repo.update(&load);
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_concurrent_booking_single_winner() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 1))
            .unwrap();
        let t1 = register_transporter(&env, "顺达物流", None, &[("平板车", Some(5))]).unwrap();
        let t2 = register_transporter(&env, "宏远运输", None, &[("平板车", Some(5))]).unwrap();
        let b1 = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t1.transporter_id,
                100.0,
                1,
                "平板车",
            ))
            .unwrap();
        let b2 = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t2.transporter_id,
                95.0,
                1,
                "平板车",
            ))
            .unwrap();

        let (sender, receiver) = mpsc::channel();
        let mut handles = Vec::new();
        for bid in [b1.clone(), b2.clone()] {
            let api = env.booking_api.clone();
            let load_id = load.load_id.clone();
            let sender = sender.clone();
            handles.push(thread::spawn(move || {
                let result = api.create_booking(CreateBookingRequest {
                    load_id,
                    bid_id: bid.bid_id.clone(),
                    transporter_id: bid.transporter_id.clone(),
                    allocated_trucks: 1,
                    final_rate: bid.proposed_rate,
                });
                sender.send(result).unwrap();
            }));
        }
        drop(sender);
        for handle in handles {
            handle.join().unwrap();
        }

        let results: Vec<_> = receiver.iter().collect();
        assert_eq!(results.len(), 2);

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "并发预订必须恰好一家成交");

        // 败者拿到的是可重试的业务错误,不是数据损坏
        for result in &results {
            if let Err(e) = result {
                assert!(
                    matches!(
                        e,
                        ApiError::VersionConflict(_)
                            | ApiError::InvalidStatusTransition(_)
                            | ApiError::InsufficientCapacity { .. }
                    ),
                    "意外的失败类型: {:?}",
                    e
                );
            }
        }

        // 终态一致: BOOKED / 余量 0 / 恰好一单 CONFIRMED 预订
        let fetched = env.load_api.get_load_by_id(&load.load_id).unwrap();
        assert_eq!(fetched.status, LoadStatus::Booked);
        assert_eq!(fetched.remaining_trucks, 0);

        let bookings = env.booking_api.get_bookings_by_load(&load.load_id).unwrap();
        let confirmed = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count();
        assert_eq!(confirmed, 1);

        // 两家合计只被扣减 1 辆
        let total = env.truck_repo.available_count(&t1.transporter_id, "平板车").unwrap()
            + env.truck_repo.available_count(&t2.transporter_id, "平板车").unwrap();
        assert_eq!(total, 9);

        assert_load_invariants(&env, &load.load_id);
    }

    #[test]
    fn test_version_monotonic_over_sequential_writes() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 3))
            .unwrap();
        let t1 = register_transporter(&env, "顺达物流", None, &[("平板车", Some(5))]).unwrap();
        let t2 = register_transporter(&env, "宏远运输", None, &[("平板车", Some(5))]).unwrap();
        let b1 = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t1.transporter_id,
                100.0,
                2,
                "平板车",
            ))
            .unwrap();
        let b2 = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t2.transporter_id,
                95.0,
                1,
                "平板车",
            ))
            .unwrap();

        // v0 -> v1: 首竞价开闸
        assert_eq!(
            env.load_api.get_load_by_id(&load.load_id).unwrap().version,
            1
        );

        // v1 -> v2: 部分预订
        env.booking_api
            .create_booking(CreateBookingRequest {
                load_id: load.load_id.clone(),
                bid_id: b1.bid_id.clone(),
                transporter_id: b1.transporter_id.clone(),
                allocated_trucks: 2,
                final_rate: b1.proposed_rate,
            })
            .unwrap();
        assert_eq!(
            env.load_api.get_load_by_id(&load.load_id).unwrap().version,
            2
        );

        // v2 -> v3: 拒绝后第二单收尾
        env.bid_api.reject_bid(&b1.bid_id).unwrap();
        env.booking_api
            .create_booking(CreateBookingRequest {
                load_id: load.load_id.clone(),
                bid_id: b2.bid_id.clone(),
                transporter_id: b2.transporter_id.clone(),
                allocated_trucks: 1,
                final_rate: b2.proposed_rate,
            })
            .unwrap();

        let fetched = env.load_api.get_load_by_id(&load.load_id).unwrap();
        assert_eq!(fetched.version, 3);
        assert_eq!(fetched.status, LoadStatus::Booked);
        assert_eq!(fetched.remaining_trucks, 0);
    }
}
