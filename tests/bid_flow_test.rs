// ==========================================
// 竞价流程测试
// ==========================================
// 职责: 验证竞价提交守卫、首竞价开闸、查询过滤、拒绝与排名
// ==========================================


#[cfg(test)]
mod bid_flow_test {
    use freight_broker::api::ApiError;
    use freight_broker::domain::types::{BidStatus, LoadStatus};

    use crate::test_helpers::{
        register_transporter, sample_bid_request, sample_load_request, setup_test_env,
    };

    #[test]
    fn test_first_bid_opens_load_for_bids() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();
        let t = register_transporter(&env, "顺达物流", Some(4.5), &[("平板车", Some(5))]).unwrap();

        let bid = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t.transporter_id,
                120.0,
                2,
                "平板车",
            ))
            .unwrap();

        assert_eq!(bid.status, BidStatus::Pending);
        assert_eq!(bid.load_id, load.load_id);

        // POSTED 在首个竞价时推进为 OPEN_FOR_BIDS,版本 +1
        let fetched = env.load_api.get_load_by_id(&load.load_id).unwrap();
        assert_eq!(fetched.status, LoadStatus::OpenForBids);
        assert_eq!(fetched.version, 1);
    }

    #[test]
    fn test_second_bid_does_not_bump_version_again() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();
        let t1 = register_transporter(&env, "顺达物流", Some(4.5), &[("平板车", Some(5))]).unwrap();
        let t2 = register_transporter(&env, "宏远运输", None, &[("平板车", Some(3))]).unwrap();

        env.bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t1.transporter_id,
                120.0,
                1,
                "平板车",
            ))
            .unwrap();
        env.bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t2.transporter_id,
                110.0,
                1,
                "平板车",
            ))
            .unwrap();

        let fetched = env.load_api.get_load_by_id(&load.load_id).unwrap();
        assert_eq!(fetched.status, LoadStatus::OpenForBids);
        // 仅首个竞价触发状态写,后续竞价不再动货载行
        assert_eq!(fetched.version, 1);

        let bids = env
            .bid_api
            .list_bids(Some(load.load_id.clone()), None, None)
            .unwrap();
        assert_eq!(bids.len(), 2);
    }

    #[test]
    fn test_bid_on_missing_load_or_transporter() {
        let (_tmp, env) = setup_test_env().unwrap();

        let result = env.bid_api.submit_bid(sample_bid_request(
            "missing-load",
            "whoever",
            100.0,
            1,
            "平板车",
        ));
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 1))
            .unwrap();
        let result = env.bid_api.submit_bid(sample_bid_request(
            &load.load_id,
            "missing-transporter",
            100.0,
            1,
            "平板车",
        ));
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_bid_on_cancelled_load_rejected() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 1))
            .unwrap();
        let t = register_transporter(&env, "顺达物流", None, &[("平板车", Some(2))]).unwrap();

        env.load_api.cancel_load(&load.load_id).unwrap();

        let result = env.bid_api.submit_bid(sample_bid_request(
            &load.load_id,
            &t.transporter_id,
            100.0,
            1,
            "平板车",
        ));
        assert!(matches!(
            result,
            Err(ApiError::InvalidStatusTransition(_))
        ));
    }

    #[test]
    fn test_bid_exceeding_fleet_capacity_rejected() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 10))
            .unwrap();
        // 同车型两行台账,校验针对车型总量 3+1=4
        let t = register_transporter(
            &env,
            "顺达物流",
            None,
            &[("平板车", Some(3)), ("平板车", Some(1))],
        )
        .unwrap();

        let result = env.bid_api.submit_bid(sample_bid_request(
            &load.load_id,
            &t.transporter_id,
            100.0,
            5,
            "平板车",
        ));
        match result {
            Err(ApiError::InsufficientCapacity {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 5);
                assert_eq!(available, 4);
            }
            other => panic!("预期 InsufficientCapacity,实际: {:?}", other),
        }

        // 恰好等于总量时通过
        env.bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t.transporter_id,
                100.0,
                4,
                "平板车",
            ))
            .unwrap();
    }

    #[test]
    fn test_list_bids_filters() {
        let (_tmp, env) = setup_test_env().unwrap();

        let l1 = env
            .load_api
            .create_load(sample_load_request("shipper-1", 3))
            .unwrap();
        let l2 = env
            .load_api
            .create_load(sample_load_request("shipper-2", 3))
            .unwrap();
        let t1 = register_transporter(&env, "顺达物流", None, &[("平板车", Some(5))]).unwrap();
        let t2 = register_transporter(&env, "宏远运输", None, &[("平板车", Some(5))]).unwrap();

        let b1 = env
            .bid_api
            .submit_bid(sample_bid_request(
                &l1.load_id,
                &t1.transporter_id,
                100.0,
                1,
                "平板车",
            ))
            .unwrap();
        env.bid_api
            .submit_bid(sample_bid_request(
                &l1.load_id,
                &t2.transporter_id,
                90.0,
                1,
                "平板车",
            ))
            .unwrap();
        env.bid_api
            .submit_bid(sample_bid_request(
                &l2.load_id,
                &t1.transporter_id,
                80.0,
                1,
                "平板车",
            ))
            .unwrap();

        env.bid_api.reject_bid(&b1.bid_id).unwrap();

        let by_load = env
            .bid_api
            .list_bids(Some(l1.load_id.clone()), None, None)
            .unwrap();
        assert_eq!(by_load.len(), 2);

        let by_transporter = env
            .bid_api
            .list_bids(None, Some(t1.transporter_id.clone()), None)
            .unwrap();
        assert_eq!(by_transporter.len(), 2);

        let rejected = env
            .bid_api
            .list_bids(None, None, Some(BidStatus::Rejected))
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].bid_id, b1.bid_id);

        let combo = env
            .bid_api
            .list_bids(
                Some(l1.load_id.clone()),
                Some(t1.transporter_id.clone()),
                Some(BidStatus::Pending),
            )
            .unwrap();
        assert!(combo.is_empty());
    }

    #[test]
    fn test_reject_bid_unconditional() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();
        let t = register_transporter(&env, "顺达物流", None, &[("平板车", Some(5))]).unwrap();

        let bid = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t.transporter_id,
                100.0,
                1,
                "平板车",
            ))
            .unwrap();

        let rejected = env.bid_api.reject_bid(&bid.bid_id).unwrap();
        assert_eq!(rejected.status, BidStatus::Rejected);

        // 重复拒绝幂等
        let again = env.bid_api.reject_bid(&bid.bid_id).unwrap();
        assert_eq!(again.status, BidStatus::Rejected);

        let result = env.bid_api.reject_bid("missing-bid");
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_best_bids_ranking() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();
        // 高价高评级 vs 低价无评级
        let expensive = register_transporter(&env, "顺达物流", Some(5.0), &[("平板车", Some(5))])
            .unwrap();
        let cheap = register_transporter(&env, "宏远运输", None, &[("平板车", Some(5))]).unwrap();

        env.bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &expensive.transporter_id,
                100.0,
                1,
                "平板车",
            ))
            .unwrap();
        env.bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &cheap.transporter_id,
                50.0,
                1,
                "平板车",
            ))
            .unwrap();

        let ranked = env.load_api.get_best_bids(&load.load_id).unwrap();
        assert_eq!(ranked.len(), 2);

        // 0.7*(1/100) + 0.3*(5/5) = 0.307 胜过 0.7*(1/50) = 0.014
        assert_eq!(ranked[0].bid.transporter_id, expensive.transporter_id);
        assert!((ranked[0].score - 0.307).abs() < 1e-9);
        assert!((ranked[1].score - 0.014).abs() < 1e-9);
    }

    #[test]
    fn test_best_bids_includes_rejected() {
        let (_tmp, env) = setup_test_env().unwrap();

        let load = env
            .load_api
            .create_load(sample_load_request("shipper-1", 2))
            .unwrap();
        let t = register_transporter(&env, "顺达物流", Some(4.0), &[("平板车", Some(5))]).unwrap();

        let bid = env
            .bid_api
            .submit_bid(sample_bid_request(
                &load.load_id,
                &t.transporter_id,
                100.0,
                1,
                "平板车",
            ))
            .unwrap();
        env.bid_api.reject_bid(&bid.bid_id).unwrap();

        // 排名对竞价状态不敏感,被拒绝的竞价仍参与
        let ranked = env.load_api.get_best_bids(&load.load_id).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].bid.bid_id, bid.bid_id);
    }
}
