#![allow(missing_docs)]

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::tempdir;

#[test]
fn concomp_labels_a_chain_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let infile = dir.path().join("chain.txt");
    fs::write(&infile, "# five-vertex chain\n0\t1\n1\t2\n2\t3\n3\t4\n").expect("write edge list");
    let outfile = dir.path().join("labels.tsv");

    let assert = cargo_bin_cmd!("concomp")
        .arg("--infile")
        .arg(&infile)
        .arg("--outfile")
        .arg(&outfile)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(
        stdout.contains("vertex 4 component = 0"),
        "expected component labels in output, got:\n{stdout}"
    );

    let labels = fs::read_to_string(&outfile).expect("read labels");
    for line in labels.lines() {
        let (_, label) = line.split_once('\t').expect("vertex<TAB>label");
        assert_eq!(label, "0", "all five vertices share component 0");
    }
    assert_eq!(labels.lines().count(), 5);
}

#[test]
fn pagerank_ranks_the_five_page_graph_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let infile = dir.path().join("pages.txt");
    fs::write(
        &infile,
        "0 3\n1 0\n1 2\n2 0\n2 1\n2 3\n3 0\n3 1\n3 2\n3 4\n4 0\n4 1\n4 2\n4 3\n",
    )
    .expect("write edge list");
    let outfile = dir.path().join("ranks.tsv");

    cargo_bin_cmd!("pagerank")
        .arg("--infile")
        .arg(&infile)
        .arg("--outfile")
        .arg(&outfile)
        .arg("--ncpus")
        .arg("2")
        .assert()
        .success();

    let ranks: Vec<f32> = fs::read_to_string(&outfile)
        .expect("read ranks")
        .lines()
        .map(|line| {
            let (_, rank) = line.split_once('\t').expect("vertex<TAB>rank");
            rank.parse().expect("numeric rank")
        })
        .collect();
    assert_eq!(ranks.len(), 5);
    assert!(ranks[3] > ranks[0] && ranks[0] > ranks[2], "page 3 leads");
    assert!(ranks[2] > ranks[1] && ranks[1] > ranks[4], "page 4 trails");
}

#[test]
fn concomp_rejects_a_missing_input_file() {
    cargo_bin_cmd!("concomp")
        .arg("--infile")
        .arg("/nonexistent/edges.txt")
        .assert()
        .failure();
}
