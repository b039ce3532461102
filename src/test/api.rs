#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rocket::http::{ContentType, Status};

    use crate::database::{get_student, get_teacher_class_ids};
    use crate::models::{Observation, Remark, Student, Teacher};
    use crate::test::test_utils::{
        TestDbBuilder, auth_header, create_standard_test_db, setup_test_client, standard_auth,
    };

    #[rocket::async_test]
    async fn test_protected_routes_reject_missing_and_wrong_credentials() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let endpoints = vec![
            "/api/students",
            "/api/students/1",
            "/api/students/class/1",
            "/api/teachers",
            "/api/teachers/1",
            "/api/remarks",
            "/api/remarks/1",
            "/api/observations",
            "/api/observations/1",
            "/api/observations/student/1",
            "/api/observations/teacher/1",
            "/api/observations/teacher/1/student/1",
        ];

        for endpoint in endpoints {
            let response = client.get(endpoint).dispatch().await;
            assert_eq!(
                response.status(),
                Status::Unauthorized,
                "Endpoint {} did not require authentication",
                endpoint
            );
            assert_eq!(
                response.headers().get_one("WWW-Authenticate"),
                Some("Basic realm=\"Svalutation\"")
            );

            let response = client
                .get(endpoint)
                .header(auth_header("admin", "wrong_password"))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Unauthorized);

            let body = response.into_string().await.unwrap_or_default();
            assert!(!body.contains("Ann"), "Endpoint {} leaked data", endpoint);
            assert!(!body.contains("Rossi"), "Endpoint {} leaked data", endpoint);
        }
    }

    #[rocket::async_test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let wrong_password = client
            .get("/api/students")
            .header(auth_header("admin", "nope"))
            .dispatch()
            .await;
        let wrong_status = wrong_password.status();
        let wrong_body = wrong_password.into_string().await;

        let unknown_user = client
            .get("/api/students")
            .header(auth_header("ghost", "password123"))
            .dispatch()
            .await;
        let unknown_status = unknown_user.status();
        let unknown_body = unknown_user.into_string().await;

        assert_eq!(wrong_status, Status::Unauthorized);
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_body, unknown_body);
    }

    #[rocket::async_test]
    async fn test_rejected_write_does_not_touch_the_database() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let ann_id = test_db.student_id("Ann");

        let response = client
            .delete(format!("/api/students/{}", ann_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .post("/api/students")
            .header(ContentType::Form)
            .header(auth_header("admin", "wrong_password"))
            .body("name=Eve&surname=Stone")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let ann = get_student(&test_db.pool, &ann_id.to_string()).await.unwrap();
        assert_eq!(ann.name, "Ann");

        let response = client
            .get("/api/students")
            .header(standard_auth())
            .dispatch()
            .await;
        let students: Vec<Student> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(students.iter().all(|s| s.name != "Eve"));
    }

    #[rocket::async_test]
    async fn test_student_create_and_get_round_trip() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let class_id = test_db.class_id("1A");

        let response = client
            .post("/api/students")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!("name=Carla&surname=Neri&class={}", class_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .get(format!("/api/students/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::JSON));

        let student: Student = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(student.id, id);
        assert_eq!(student.name, "Carla");
        assert_eq!(student.surname, "Neri");

        let class = student.class.expect("student should carry its class");
        assert_eq!(class.id, class_id);
        assert_eq!(class.name, "1A");

        let response = client
            .get(format!("/api/students/class/{}", class_id))
            .header(standard_auth())
            .dispatch()
            .await;
        let in_class: Vec<Student> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let names: Vec<&str> = in_class.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Carla"]);
    }

    #[rocket::async_test]
    async fn test_student_without_class_serializes_null_class() {
        let test_db = TestDbBuilder::new()
            .student("Solo", "Walker", None)
            .credential("admin", "password123")
            .build()
            .await
            .unwrap();
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .get(format!("/api/students/{}", test_db.student_id("Solo")))
            .header(standard_auth())
            .dispatch()
            .await;
        let value: serde_json::Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(value["class"].is_null());
    }

    #[rocket::async_test]
    async fn test_student_partial_update_keeps_other_fields() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let ann_id = test_db.student_id("Ann");

        let response = client
            .patch(format!("/api/students/{}", ann_id))
            .header(ContentType::Form)
            .header(standard_auth())
            .body("surname=Park&name=")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap_or_default(), "");

        let ann = get_student(&test_db.pool, &ann_id.to_string()).await.unwrap();
        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.surname, "Park");
        assert_eq!(ann.class.map(|c| c.name), Some("1A".to_string()));
    }

    #[rocket::async_test]
    async fn test_invalid_form_fields_are_bad_requests() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let cases = vec![
            ("/api/students", "name=NoSurname".to_string()),
            ("/api/students", "name=Ann&surname=Lee&class=abc".to_string()),
            ("/api/teachers", "name=Gina&surname=Verdi&classes=[1,x]".to_string()),
            ("/api/teachers", "name=Gina&surname=Verdi&classes=1".to_string()),
            ("/api/remarks", "skill=Writing".to_string()),
            ("/api/remarks", "skill=Writing&level=high".to_string()),
            (
                "/api/observations",
                format!(
                    "teacher={}&student={}&remark={}&achieved=maybe",
                    test_db.teacher_id("Maria"),
                    test_db.student_id("Ann"),
                    test_db.remark_id("Reading")
                ),
            ),
            (
                "/api/observations",
                format!(
                    "teacher={}&student={}&remark={}&date=yesterday",
                    test_db.teacher_id("Maria"),
                    test_db.student_id("Ann"),
                    test_db.remark_id("Reading")
                ),
            ),
            ("/api/observations", "teacher=1&student=1".to_string()),
        ];

        for (endpoint, body) in cases {
            let response = client
                .post(endpoint)
                .header(ContentType::Form)
                .header(standard_auth())
                .body(body.clone())
                .dispatch()
                .await;
            assert_eq!(
                response.status(),
                Status::BadRequest,
                "POST {} with {} should be rejected",
                endpoint,
                body
            );
        }
    }

    #[rocket::async_test]
    async fn test_observation_with_unknown_references_is_rejected() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/observations")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "teacher=999&student={}&remark={}&achieved=true",
                test_db.student_id("Ann"),
                test_db.remark_id("Reading")
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_teacher_class_set_is_replaced() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let (first, second, third) = (
            test_db.class_id("1A"),
            test_db.class_id("2B"),
            test_db.class_id("3C"),
        );

        let response = client
            .post("/api/teachers")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "name=Gina&surname=Verdi&classes=[{},{}]",
                first, second
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .get(format!("/api/teachers/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        let teacher: Teacher = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let class_ids: Vec<i64> = teacher.classes.iter().map(|c| c.id).collect();
        assert_eq!(class_ids, vec![first, second]);

        let response = client
            .patch(format!("/api/teachers/{}", id))
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!("classes=[{}]", third))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/teachers/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        let teacher: Teacher = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(teacher.name, "Gina");
        assert_eq!(teacher.classes.len(), 1);
        assert_eq!(teacher.classes[0].id, third);
        assert_eq!(teacher.classes[0].name, "3C");
    }

    #[rocket::async_test]
    async fn test_teacher_update_without_classes_keeps_links() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let maria_id = test_db.teacher_id("Maria");

        let response = client
            .patch(format!("/api/teachers/{}", maria_id))
            .header(ContentType::Form)
            .header(standard_auth())
            .body("surname=Russo")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let class_ids = get_teacher_class_ids(&test_db.pool, maria_id).await.unwrap();
        assert_eq!(
            class_ids,
            vec![test_db.class_id("1A"), test_db.class_id("2B")]
        );
    }

    #[rocket::async_test]
    async fn test_teacher_delete_removes_class_links() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let maria_id = test_db.teacher_id("Maria");

        let response = client
            .delete(format!("/api/teachers/{}", maria_id))
            .header(standard_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let class_ids = get_teacher_class_ids(&test_db.pool, maria_id).await.unwrap();
        assert!(class_ids.is_empty());

        let response = client
            .get(format!("/api/teachers/{}", maria_id))
            .header(standard_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_deleting_an_observed_teacher_is_rejected() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let maria_id = test_db.teacher_id("Maria");

        let response = client
            .post("/api/observations")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "teacher={}&student={}&remark={}",
                maria_id,
                test_db.student_id("Ann"),
                test_db.remark_id("Reading")
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .delete(format!("/api/teachers/{}", maria_id))
            .header(standard_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let class_ids = get_teacher_class_ids(&test_db.pool, maria_id).await.unwrap();
        assert_eq!(
            class_ids,
            vec![test_db.class_id("1A"), test_db.class_id("2B")]
        );
    }

    #[rocket::async_test]
    async fn test_remark_round_trip_and_update() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/remarks")
            .header(ContentType::Form)
            .header(standard_auth())
            .body("skill=Counting&level=3&description=Counts+to+100")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .patch(format!("/api/remarks/{}", id))
            .header(ContentType::Form)
            .header(standard_auth())
            .body("level=4")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/remarks/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        let remark: Remark = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(
            remark,
            Remark {
                id,
                skill: "Counting".to_string(),
                level: 4,
                description: "Counts to 100".to_string(),
            }
        );
    }

    #[rocket::async_test]
    async fn test_observation_round_trip_is_fully_hydrated() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let maria_id = test_db.teacher_id("Maria");
        let ann_id = test_db.student_id("Ann");
        let remark_id = test_db.remark_id("Reading");

        let response = client
            .post("/api/observations")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "teacher={}&student={}&remark={}&achieved=true&date=2024-03-01",
                maria_id, ann_id, remark_id
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .get(format!("/api/observations/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let observation: Observation =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        assert_eq!(observation.id, id);
        assert!(observation.achieved);
        assert_eq!(
            observation.date,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );

        assert_eq!(observation.teacher.id, maria_id);
        assert_eq!(observation.teacher.surname, "Rossi");
        let teacher_classes: Vec<&str> = observation
            .teacher
            .classes
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(teacher_classes, vec!["1A", "2B"]);

        assert_eq!(observation.student.id, ann_id);
        assert_eq!(
            observation.student.class.as_ref().map(|c| c.name.as_str()),
            Some("1A")
        );

        assert_eq!(observation.remark.id, remark_id);
        assert_eq!(observation.remark.skill, "Reading");
        assert_eq!(observation.remark.level, 2);
    }

    #[rocket::async_test]
    async fn test_observation_date_defaults_to_now() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/observations")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "teacher={}&student={}&remark={}",
                test_db.teacher_id("Paolo"),
                test_db.student_id("Bob"),
                test_db.remark_id("Reading")
            ))
            .dispatch()
            .await;
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .get(format!("/api/observations/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        let observation: Observation =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        assert!(!observation.achieved);
        let drift = (Utc::now() - observation.date).num_seconds().abs();
        assert!(drift < 120, "default date is {}s away from now", drift);
    }

    #[rocket::async_test]
    async fn test_observation_filters() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let maria_id = test_db.teacher_id("Maria");
        let paolo_id = test_db.teacher_id("Paolo");
        let ann_id = test_db.student_id("Ann");
        let bob_id = test_db.student_id("Bob");
        let remark_id = test_db.remark_id("Reading");

        for (teacher, student) in [(maria_id, ann_id), (maria_id, bob_id), (paolo_id, ann_id)] {
            let response = client
                .post("/api/observations")
                .header(ContentType::Form)
                .header(standard_auth())
                .body(format!(
                    "teacher={}&student={}&remark={}&achieved=1",
                    teacher, student, remark_id
                ))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let fetch = |uri: String| {
            let client = &client;
            async move {
                let response = client.get(uri).header(standard_auth()).dispatch().await;
                assert_eq!(response.status(), Status::Ok);
                let observations: Vec<Observation> =
                    serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
                observations
            }
        };

        assert_eq!(fetch("/api/observations".to_string()).await.len(), 3);

        let by_student = fetch(format!("/api/observations/student/{}", ann_id)).await;
        assert_eq!(by_student.len(), 2);
        assert!(by_student.iter().all(|o| o.student.id == ann_id));

        let by_teacher = fetch(format!("/api/observations/teacher/{}", maria_id)).await;
        assert_eq!(by_teacher.len(), 2);
        assert!(by_teacher.iter().all(|o| o.teacher.id == maria_id));

        let by_pair = fetch(format!(
            "/api/observations/teacher/{}/student/{}",
            paolo_id, ann_id
        ))
        .await;
        assert_eq!(by_pair.len(), 1);
        assert_eq!(by_pair[0].teacher.id, paolo_id);
        assert_eq!(by_pair[0].student.id, ann_id);

        let none = fetch(format!(
            "/api/observations/teacher/{}/student/{}",
            paolo_id, bob_id
        ))
        .await;
        assert!(none.is_empty());
    }

    #[rocket::async_test]
    async fn test_observation_partial_update() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/observations")
            .header(ContentType::Form)
            .header(standard_auth())
            .body(format!(
                "teacher={}&student={}&remark={}&achieved=false&date=2024-01-15",
                test_db.teacher_id("Maria"),
                test_db.student_id("Ann"),
                test_db.remark_id("Reading")
            ))
            .dispatch()
            .await;
        let id: i64 = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();

        let response = client
            .patch(format!("/api/observations/{}", id))
            .header(ContentType::Form)
            .header(standard_auth())
            .body("achieved=true")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/observations/{}", id))
            .header(standard_auth())
            .dispatch()
            .await;
        let observation: Observation =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(observation.achieved);
        assert_eq!(
            observation.date,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(observation.student.name, "Ann");
    }

    #[rocket::async_test]
    async fn test_repeated_gets_are_byte_identical() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let uris = vec![
            format!("/api/students/{}", test_db.student_id("Ann")),
            format!("/api/teachers/{}", test_db.teacher_id("Maria")),
            "/api/teachers".to_string(),
            "/api/remarks".to_string(),
        ];

        for uri in uris {
            let first = client
                .get(uri.clone())
                .header(standard_auth())
                .dispatch()
                .await
                .into_string()
                .await;
            let second = client
                .get(uri.clone())
                .header(standard_auth())
                .dispatch()
                .await
                .into_string()
                .await;
            assert!(first.is_some());
            assert_eq!(first, second, "GET {} changed between calls", uri);
        }
    }

    #[rocket::async_test]
    async fn test_delete_is_idempotent() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let uris = vec![
            format!("/api/students/{}", test_db.student_id("Bob")),
            format!("/api/remarks/{}", test_db.remark_id("Reading")),
            format!("/api/teachers/{}", test_db.teacher_id("Paolo")),
            "/api/observations/42".to_string(),
        ];

        for uri in uris {
            for attempt in 0..2 {
                let response = client
                    .delete(uri.clone())
                    .header(standard_auth())
                    .dispatch()
                    .await;
                assert_eq!(
                    response.status(),
                    Status::Ok,
                    "DELETE {} attempt {} failed",
                    uri,
                    attempt
                );
            }
        }
    }

    #[rocket::async_test]
    async fn test_unknown_ids_are_not_found() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        for uri in [
            "/api/students/999",
            "/api/teachers/999",
            "/api/remarks/999",
            "/api/observations/999",
        ] {
            let response = client.get(uri).header(standard_auth()).dispatch().await;
            assert_eq!(response.status(), Status::NotFound, "GET {}", uri);

            let response = client
                .patch(uri)
                .header(ContentType::Form)
                .header(standard_auth())
                .body("name=Nobody")
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::NotFound, "PATCH {}", uri);
        }
    }
}
