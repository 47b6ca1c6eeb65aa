//! Protocol layer tests: envelopes, command names, failures, framing.

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};
    use actl_protocol::*;

    fn collect(decoder: &mut FrameDecoder, chunk: &[u8]) -> Vec<String> {
        decoder
            .feed(chunk)
            .map(|frame| frame.expect("frame within limits"))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // CommandRequest
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn request_parses_command_and_params() {
        let req = CommandRequest::parse(r#"{"command":"spawn_actor","params":{"kind":"PointLight","x":1}}"#)
            .unwrap();
        assert_eq!(req.command, "spawn_actor");
        let params = req.params_object().unwrap();
        assert_eq!(params["kind"], "PointLight");
        assert_eq!(params["x"], 1);
    }

    #[test]
    fn request_without_params() {
        let req = CommandRequest::parse(r#"{"command":"get_scene_info"}"#).unwrap();
        assert_eq!(req.command, "get_scene_info");
        assert!(req.params.is_none());
        assert!(req.params_object().is_none());
    }

    #[test]
    fn request_keeps_non_object_params_for_handler() {
        let req = CommandRequest::parse(r#"{"command":"delete_actor","params":[1,2]}"#).unwrap();
        assert_eq!(req.params, Some(json!([1, 2])));
        assert!(req.params_object().is_none());
    }

    #[test]
    fn request_invalid_json() {
        assert_eq!(CommandRequest::parse("not json"), Err(CommandFailure::InvalidJson));
        assert_eq!(CommandRequest::parse(""), Err(CommandFailure::InvalidJson));
    }

    #[test]
    fn request_non_object_is_invalid_json() {
        assert_eq!(CommandRequest::parse("42"), Err(CommandFailure::InvalidJson));
        assert_eq!(CommandRequest::parse(r#"["command"]"#), Err(CommandFailure::InvalidJson));
    }

    #[test]
    fn request_missing_or_mistyped_command() {
        assert_eq!(CommandRequest::parse(r#"{"foo":1}"#), Err(CommandFailure::MissingCommand));
        assert_eq!(CommandRequest::parse(r#"{"command":7}"#), Err(CommandFailure::MissingCommand));
        assert_eq!(CommandRequest::parse(r#"{"command":""}"#), Err(CommandFailure::MissingCommand));
    }

    #[test]
    fn request_new_omits_empty_params() {
        let req = CommandRequest::new("get_scene_info", Some(Map::new()));
        assert_eq!(req.to_line(), r#"{"command":"get_scene_info"}"#);

        let mut params = Map::new();
        params.insert("id".into(), json!("PointLight_1"));
        let req = CommandRequest::new("delete_actor", Some(params));
        let parsed: Value = serde_json::from_str(&req.to_line()).unwrap();
        assert_eq!(parsed, json!({"command": "delete_actor", "params": {"id": "PointLight_1"}}));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Response
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn error_response_wire_format() {
        let resp = Response::error("Unknown command");
        assert_eq!(resp.to_line(), r#"{"success":false,"error":"Unknown command"}"#);
        assert_eq!(resp.error_message(), Some("Unknown command"));
        assert!(!resp.is_success());
    }

    #[test]
    fn success_response_puts_success_first() {
        let resp = Response::ok().with("id", "PointLight_1");
        assert_eq!(resp.to_line(), r#"{"success":true,"id":"PointLight_1"}"#);
        assert!(resp.error_message().is_none());
    }

    #[test]
    fn response_deserializes_from_wire() {
        let resp: Response =
            serde_json::from_str(r#"{"success":true,"actors":[],"extra":1}"#).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.get("actors"), Some(&json!([])));
        assert_eq!(resp.get("extra"), Some(&json!(1)));
        assert!(resp.get("success").is_none());
    }

    #[test]
    fn failure_renders_into_envelope() {
        let resp: Response = CommandFailure::missing_params("spawn_actor").into();
        assert_eq!(resp.to_line(), r#"{"success":false,"error":"Missing params for spawn_actor"}"#);

        let resp: Response = CommandFailure::missing_param("id").into();
        assert_eq!(resp.error_message(), Some("Missing required param: id"));

        let resp: Response = CommandFailure::invalid_param("visible").into();
        assert_eq!(resp.error_message(), Some("Invalid param: visible"));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn known_commands() {
        assert!(is_known_command(Commands::SPAWN_ACTOR));
        assert!(is_known_command("set_transform"));
        assert!(!is_known_command("Spawn_Actor"));
        assert!(!is_known_command("frobnicate"));
        assert_eq!(Commands::ALL.len(), 9);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Framing
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn framing_every_split_yields_same_frames() {
        let stream = b"{\"a\":1}\n{\"b\":2}\n";
        for split in 0..=stream.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = collect(&mut decoder, &stream[..split]);
            frames.extend(collect(&mut decoder, &stream[split..]));
            assert_eq!(frames, vec![r#"{"a":1}"#, r#"{"b":2}"#], "split at {split}");
            assert_eq!(decoder.pending_len(), 0);
        }
    }

    #[test]
    fn framing_retains_partial_tail() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(collect(&mut decoder, b"{\"command\":"), Vec::<String>::new());
        assert_eq!(decoder.pending_len(), 11);
        assert_eq!(collect(&mut decoder, b"\"x\"}\n{\"y"), vec![r#"{"command":"x"}"#]);
        assert_eq!(decoder.pending_len(), 3);
    }

    #[test]
    fn framing_trims_whitespace_and_crlf() {
        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, b"  {\"a\":1}  \r\n\t{\"b\":2}\n");
        assert_eq!(frames, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn framing_yields_blank_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, b"\n   \n");
        assert_eq!(frames, vec!["", ""]);
    }

    #[test]
    fn framing_multibyte_split_across_reads() {
        let line = "{\"name\":\"caf\u{e9}\u{1f3ac}\"}\n".as_bytes();
        for split in 0..line.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = collect(&mut decoder, &line[..split]);
            frames.extend(collect(&mut decoder, &line[split..]));
            assert_eq!(frames, vec!["{\"name\":\"caf\u{e9}\u{1f3ac}\"}"]);
        }
    }

    #[test]
    fn framing_is_lazy() {
        let mut decoder = FrameDecoder::new();
        let mut frames = decoder.feed(b"one\ntwo\nthree\n");
        assert_eq!(frames.next(), Some(Ok("one".to_string())));
        drop(frames);
        assert_eq!(decoder.pending_len(), "two\nthree\n".len());
        assert_eq!(collect(&mut decoder, b""), vec!["two", "three"]);
    }

    #[test]
    fn framing_finish_discards_partial_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(collect(&mut decoder, b"{\"command\":\"x\"").is_empty());
        assert_eq!(decoder.finish(), 14);
    }

    #[test]
    fn framing_limit_rejects_long_pending_line() {
        let mut decoder = FrameDecoder::new().with_max_frame_len(8);
        let mut frames = decoder.feed(b"0123456789");
        assert_eq!(frames.next(), Some(Err(FrameError::TooLong { limit: 8 })));
        assert_eq!(frames.next(), None);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn framing_limit_rejects_long_complete_line() {
        let mut decoder = FrameDecoder::new().with_max_frame_len(4);
        let results: Vec<_> = decoder.feed(b"ok\n0123456\n").collect();
        assert_eq!(results[0], Ok("ok".to_string()));
        assert_eq!(results[1], Err(FrameError::TooLong { limit: 4 }));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn framing_limit_allows_lines_at_limit() {
        let mut decoder = FrameDecoder::new().with_max_frame_len(4);
        assert_eq!(collect(&mut decoder, b"abcd\n"), vec!["abcd"]);
    }
}
