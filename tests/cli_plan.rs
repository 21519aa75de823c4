//! Plan command integration tests: the declared build graph order.

mod common;

use common::TestEnv;

#[test]
fn plan_lists_the_six_steps_in_dependency_order() {
    let env = TestEnv::builder().build();

    let result = env.run(&["plan"]);
    assert!(result.success, "plan failed: {}", result.combined_output());

    let expected = [
        "provision-base",
        "stage-manifest",
        "install-dependencies",
        "copy-source",
        "normalize-entrypoint",
        "declare-port",
    ];
    let mut last = 0;
    for step in expected {
        let pos = result
            .stdout
            .find(step)
            .unwrap_or_else(|| panic!("step '{step}' missing from plan:\n{}", result.stdout));
        assert!(pos > last, "step '{step}' out of order");
        last = pos;
    }
}

#[test]
fn plan_json_declares_requires_and_produces() {
    let env = TestEnv::builder().build();

    let result = env.run(&["plan", "--json"]);
    assert!(result.success);

    let event = result.json();
    assert_eq!(event["event"], "plan");
    assert_eq!(event["image"], "lego-bot");

    let steps = event["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 6);

    let install = steps
        .iter()
        .find(|s| s["step"] == "install-dependencies")
        .unwrap();
    assert_eq!(install["requires"][0], "staged-manifest");
    assert_eq!(install["produces"], "dependency-set");
    assert_eq!(install["commits_layer"], true);

    let declare = steps.iter().find(|s| s["step"] == "declare-port").unwrap();
    assert_eq!(declare["commits_layer"], false);
}

#[test]
fn plan_requires_a_recipe() {
    let env = TestEnv::builder().build();
    env.remove_project_file("stratum.toml");

    let result = env.run(&["plan"]);
    assert!(!result.success);
    assert!(result.stderr.contains("recipe file not found"));
}
