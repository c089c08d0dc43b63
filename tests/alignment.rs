//! End-to-end alignment behavior through the public library API.

use est2genome::align::{align_linear_space, AlignConfig, EditOp, IntronKind};
use est2genome::scoring::{SpliceSiteMap, SubstitutionTable};

fn unit_table() -> SubstitutionTable {
    SubstitutionTable::build(1, 1, 1, 0, b'-')
}

#[test]
fn local_alignment_of_embedded_transcript() {
    let table = unit_table();
    let config = AlignConfig {
        gap: 1,
        intron_penalty: 40,
        splice_penalty: 20,
    };
    let result = align_linear_space(b"ACGT", b"AGT", &table, None, &config, 1 << 20).unwrap();
    // Best local alignment is GT against GT; extending left costs a gap or
    // a mismatch and never recovers it.
    assert_eq!(result.score, 2);
    assert_eq!(result.operations, vec![EditOp::Match, EditOp::Match]);
    assert_eq!((result.genome_start, result.genome_end), (2, 3));
    assert_eq!((result.transcript_start, result.transcript_end), (1, 2));
}

#[test]
fn forced_recursion_reproduces_the_dense_local_result() {
    let table = unit_table();
    let config = AlignConfig {
        gap: 1,
        intron_penalty: 40,
        splice_penalty: 20,
    };
    // One byte of path matrix cannot hold the 5x4 problem, so the engine
    // scans for the best region, trims, and recurses.
    let result = align_linear_space(b"ACGT", b"AGT", &table, None, &config, 1).unwrap();
    assert_eq!(result.score, 2);
    assert_eq!(result.operations, vec![EditOp::Match, EditOp::Match]);
    assert_eq!((result.genome_start, result.genome_end), (2, 3));
    assert_eq!((result.transcript_start, result.transcript_end), (1, 2));
}

#[test]
fn spliced_intron_is_found_and_priced_by_its_signals() {
    let genome = b"GCAGTAAAAAAAGCTC";
    let transcript = b"GCACTC";
    let table = unit_table();
    let config = AlignConfig {
        gap: 2,
        intron_penalty: 40,
        splice_penalty: 1,
    };
    let map = SpliceSiteMap::build(genome, true);
    let result =
        align_linear_space(genome, transcript, &table, Some(map.view()), &config, 1 << 20)
            .unwrap();
    assert_eq!(result.score, 5);
    assert_eq!(result.operations.len(), 7);
    assert_eq!(
        result.operations[3],
        EditOp::Intron {
            length: 10,
            kind: IntronKind::ForwardSpliced,
        }
    );
    assert_eq!((result.genome_start, result.genome_end), (0, 15));
    assert_eq!((result.transcript_start, result.transcript_end), (0, 5));
    assert_eq!(
        result.replay_score(genome, transcript, &table, &config),
        result.score
    );
}

#[test]
fn reverse_splice_signals_win_on_a_reversed_gene() {
    // Exons of G flanking a ct..ac intron, the reverse-orientation signal.
    let genome = b"GGGCTAAAAACGGG";
    let transcript = b"GGGGGG";
    let table = unit_table();
    let config = AlignConfig {
        gap: 2,
        intron_penalty: 40,
        splice_penalty: 1,
    };
    let forward = SpliceSiteMap::build(genome, true);
    let reverse = SpliceSiteMap::build(genome, false);

    let with_reverse =
        align_linear_space(genome, transcript, &table, Some(reverse.view()), &config, 1 << 20)
            .unwrap();
    assert_eq!(with_reverse.score, 5);
    assert!(with_reverse
        .operations
        .iter()
        .any(|op| matches!(op, EditOp::Intron { length: 8, kind: IntronKind::ReverseSpliced })));

    // The forward map sees no gt..ag here, so the intron is unaffordable
    // and the best forward alignment is a single exon.
    let with_forward =
        align_linear_space(genome, transcript, &table, Some(forward.view()), &config, 1 << 20)
            .unwrap();
    assert!(with_forward.score < with_reverse.score);
}

#[test]
fn unsignalled_intron_pays_the_flat_penalty() {
    let genome = b"GCAGTAAAAAAAGCTC";
    let transcript = b"GCACTC";
    let table = unit_table();
    let config = AlignConfig {
        gap: 2,
        intron_penalty: 2,
        splice_penalty: 1,
    };
    let result = align_linear_space(genome, transcript, &table, None, &config, 1 << 20).unwrap();
    assert_eq!(result.score, 4);
    assert!(result
        .operations
        .iter()
        .any(|op| matches!(op, EditOp::Intron { kind: IntronKind::Unscored, .. })));
}

#[test]
fn hopeless_inputs_give_an_empty_result() {
    let table = unit_table();
    let config = AlignConfig {
        gap: 1,
        intron_penalty: 40,
        splice_penalty: 20,
    };
    // No shared residues at all; nothing scores above zero, and the
    // over-budget path must report that as empty rather than erroring.
    let result = align_linear_space(b"AAAAAAAA", b"CCCCCC", &table, None, &config, 1).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.score, 0);
}
