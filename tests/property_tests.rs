use proptest::prelude::*;

use empathizer::config::{CategoryWeights, Config, WEIGHT_EPSILON};
use empathizer::core::{FetchOutcome, FileSet, MemorySource, RawFile};
use empathizer::metrics::{Category, MAX_SCORE, MIN_SCORE};
use empathizer::pipeline::{self, Pipeline};

fn snippet() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("x = 1\n"),
        Just("if x:\n    pass\n"),
        Just("for i in range(10):\n    for j in range(i):\n        for k in range(j):\n            print(k)\n"),
        Just("def f(a, b, c, d, e, f, g, h):\n    return a\n"),
        Just("try:\n    open('a')\nexcept OSError:\n    pass\n"),
        Just("# TODO: tidy\n"),
        Just("eval(user_input)\n"),
        Just("class Thing:\n    \"\"\"A thing.\"\"\"\n    def run(self):\n        return 42\n"),
        Just("def broken(:\n"),
    ]
}

fn repo(id: &str, files: &[String]) -> MemorySource {
    let mut source = MemorySource::new(id);
    for (i, content) in files.iter().enumerate() {
        source.push(format!("pkg/mod_{i}.py"), content.clone());
    }
    source
}

fn god_class(methods: usize) -> String {
    let mut src = String::from("class Manager:\n");
    for i in 0..methods {
        src.push_str(&format!("    def handle_{i}(self):\n        pass\n\n"));
    }
    src
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every category score and the final score stay within 0..=100.
    #[test]
    fn scores_are_bounded(
        reference in prop::collection::vec(prop::collection::vec(snippet(), 0..6), 0..4),
        candidate in prop::collection::vec(prop::collection::vec(snippet(), 0..6), 1..4),
    ) {
        let config = Config::default();
        let reference: Vec<String> = reference.iter().map(|parts| parts.concat()).collect();
        let candidate: Vec<String> = candidate.iter().map(|parts| parts.concat()).collect();
        let comparison = pipeline::compare(&repo("ref", &reference), &repo("cand", &candidate), &config).unwrap();

        for profile in [&comparison.reference, &comparison.candidate] {
            prop_assert_eq!(profile.scores.len(), 11);
            for score in profile.scores.iter() {
                prop_assert!(score.value() >= MIN_SCORE && score.value() <= MAX_SCORE,
                    "{} out of range: {}", score.category, score.value());
            }
        }
        let result = &comparison.result;
        prop_assert!(result.score.is_finite());
        prop_assert!(result.score >= MIN_SCORE && result.score <= MAX_SCORE);
        prop_assert!(result.base_score >= MIN_SCORE && result.base_score <= MAX_SCORE);
    }

    /// Any positive weight vector, once normalized, passes validation.
    #[test]
    fn normalized_weights_sum_to_one(raw in prop::collection::vec(0.001f64..10.0, 11)) {
        let total: f64 = raw.iter().sum();
        let w: Vec<f64> = raw.iter().map(|v| v / total).collect();
        let weights = CategoryWeights {
            naming: w[0],
            documentation: w[1],
            modularity: w[2],
            complexity: w[3],
            error_handling: w[4],
            testing: w[5],
            security: w[6],
            style_consistency: w[7],
            patterns: w[8],
            performance: w[9],
            comments: w[10],
        };
        prop_assert!((weights.sum() - 1.0).abs() < WEIGHT_EPSILON);
        let config = Config { weights, ..Config::default() };
        prop_assert!(config.validate().is_ok());
    }

    /// Delivery order of the files does not change the profile.
    #[test]
    fn profile_is_order_independent(
        files in prop::collection::vec(prop::collection::vec(snippet(), 1..5), 1..6)
            .prop_flat_map(|files| {
                let indexed: Vec<(usize, Vec<&'static str>)> = files.into_iter().enumerate().collect();
                (Just(indexed.clone()), Just(indexed).prop_shuffle())
            })
    ) {
        let (ordered, shuffled) = files;
        let outcomes = |list: &[(usize, Vec<&'static str>)]| -> Vec<FetchOutcome> {
            list.iter()
                .map(|(i, parts)| FetchOutcome::Fetched(RawFile::new(format!("src/f{i}.py"), parts.concat())))
                .collect()
        };
        let config = Config::default();
        let pipeline = Pipeline::new(&config);
        let a = pipeline
            .profile("repo", FileSet::from_outcomes(outcomes(&ordered), &config).unwrap())
            .unwrap();
        let b = pipeline
            .profile("repo", FileSet::from_outcomes(outcomes(&shuffled), &config).unwrap())
            .unwrap();
        for category in Category::ALL {
            prop_assert!((a.scores.value(category) - b.scores.value(category)).abs() < 1e-9);
        }
        prop_assert_eq!(a.coverage, b.coverage);
    }

    /// Past the god-class threshold, more methods never raise the pattern score.
    #[test]
    fn god_class_penalty_is_monotone(methods in 21usize..80, extra in 1usize..20) {
        let config = Config::default();
        let score = |n: usize| {
            let source = MemorySource::new("repo").with_file("manager.py", god_class(n));
            pipeline::profile(&source, &config).unwrap().scores.value(Category::Patterns)
        };
        let fewer = score(methods);
        let more = score(methods + extra);
        prop_assert!(more <= fewer, "{} methods: {}, {} methods: {}", methods, fewer, methods + extra, more);
        prop_assert!(fewer < 100.0);
    }
}
