//! Tests the move generator (chess module)
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////

mod move_gen {
    use windmill::chess::variations;

    mod initial_position {
        use super::count;
        const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 20); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 400); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 8902); }

        #[test]
        fn depth_4() { assert_eq!(count(FEN, 4), 197281); }

        #[test]
        fn depth_5() { assert_eq!(count(FEN, 5), 4865609); }

        #[test]
        #[ignore]
        fn depth_6() { assert_eq!(count(FEN, 6), 119060324); }
    }

    mod castling_and_promotions {
        use super::count;
        const FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 48); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 2039); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 97862); }

        #[test]
        #[ignore]
        fn depth_4() { assert_eq!(count(FEN, 4), 4085603); }

        #[test]
        #[ignore]
        fn depth_5() { assert_eq!(count(FEN, 5), 193690690); }
    }

    mod en_passant_pins {
        use super::count;
        const FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/6P1/8 w - - 0 1";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 14); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 191); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 2812); }

        #[test]
        fn depth_4() { assert_eq!(count(FEN, 4), 43238); }

        #[test]
        fn depth_5() { assert_eq!(count(FEN, 5), 674624); }

        #[test]
        #[ignore]
        fn depth_6() { assert_eq!(count(FEN, 6), 11030083); }
    }

    mod promotion_threats {
        use super::count;
        const FEN: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 6); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 264); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 9467); }

        #[test]
        fn depth_4() { assert_eq!(count(FEN, 4), 422333); }

        #[test]
        #[ignore]
        fn depth_5() { assert_eq!(count(FEN, 5), 15833292); }
    }

    mod underpromotion_checks {
        use super::count;
        const FEN: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 44); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 1486); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 62379); }

        #[test]
        #[ignore]
        fn depth_4() { assert_eq!(count(FEN, 4), 2103487); }
    }

    mod symmetrical_middlegame {
        use super::count;
        const FEN: &str =
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 46); }

        #[test]
        fn depth_2() { assert_eq!(count(FEN, 2), 2079); }

        #[test]
        fn depth_3() { assert_eq!(count(FEN, 3), 89890); }

        #[test]
        #[ignore]
        fn depth_4() { assert_eq!(count(FEN, 4), 3894594); }
    }

    mod en_passant_capture {
        use super::count;
        const FEN: &str = "rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";

        #[test]
        fn depth_1() { assert_eq!(count(FEN, 1), 31); }

        #[test]
        #[ignore]
        fn depth_5() { assert_eq!(count(FEN, 5), 11139762); }
    }

    fn count(fen: &str, depth: usize) -> usize {
        println!("\n{}", fen);
        let mut pos = fen.parse().expect("valid position");

        let count = variations::print(&mut pos, depth);
        println!("Depth {} total:\t{:12}", depth, count);

        count
    }
}
